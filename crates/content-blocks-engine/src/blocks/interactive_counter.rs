use serde_json::json;

use super::{ALIGNMENTS, color, titled, wrapper};
use crate::component::{Component, Control, Inspector, Panel, Widget};
use crate::markup::{Element, Style};
use crate::schema::{
    AttributeSchema, AttributeSet, FieldSpec, Rule, SchemaBuilder, SchemaError, ValidationError, clamp,
};

/// Store namespace written as `data-cb-interactive`.
pub const NAMESPACE: &str = "counter";
pub const LABEL_CLASS: &str = "counter-label";

pub const DEFAULT_VALUE: i64 = 0;
pub const DEFAULT_STEP: i64 = 1;
pub const DEFAULT_MIN: i64 = -100;
pub const DEFAULT_MAX: i64 = 100;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Largest magnitude accepted for the value and its bounds.
pub const VALUE_LIMIT: i64 = 1000;

const COUNTER_STYLES: &[&str] = &["default", "card", "minimal", "gradient"];
const BUTTON_STYLES: &[&str] = &["default", "rounded", "outlined", "minimal"];
const ANIMATIONS: &[&str] = &["none", "pulse", "bounce", "fade"];

/// A labelled counter driven by the client view store.
#[derive(Debug)]
pub struct InteractiveCounter {
    schema: AttributeSchema,
}

impl InteractiveCounter {
    pub const NAME: &'static str = "interactive-counter";

    pub fn new() -> Result<Self, SchemaError> {
        let limit = VALUE_LIMIT as f64;
        let schema = SchemaBuilder::new()
            .field(FieldSpec::string("label").default("Counter").rich_text().markup(LABEL_CLASS))
            .field(
                FieldSpec::integer("initialValue")
                    .default(DEFAULT_VALUE)
                    .range(-limit, limit)
                    .clamp()
                    .context("value"),
            )
            .field(FieldSpec::integer("step").default(DEFAULT_STEP).range(1.0, 100.0).clamp().context("step"))
            .field(FieldSpec::integer("minValue").default(DEFAULT_MIN).range(-limit, limit).clamp().context("min"))
            .field(FieldSpec::integer("maxValue").default(DEFAULT_MAX).range(-limit, limit).clamp().context("max"))
            .field(FieldSpec::boolean("autoIncrement").default(false).context("autoIncrement"))
            .field(
                FieldSpec::integer("autoIncrementInterval")
                    .default(DEFAULT_INTERVAL_MS)
                    .range(100.0, 10_000.0)
                    .clamp()
                    .context("autoIncrementInterval"),
            )
            .field(FieldSpec::boolean("showControls").default(true))
            .field(FieldSpec::boolean("showReset").default(true))
            .field(FieldSpec::enumeration("counterStyle", COUNTER_STYLES).default("default"))
            .field(FieldSpec::enumeration("buttonStyle", BUTTON_STYLES).default("default"))
            .field(FieldSpec::enumeration("animation", ANIMATIONS).default("none"))
            .field(FieldSpec::enumeration("textAlign", ALIGNMENTS).default("center"))
            .field(FieldSpec::string("labelColor").default(""))
            .field(FieldSpec::string("valueColor").default(""))
            .field(FieldSpec::string("buttonColor").default(""))
            .field(FieldSpec::string("backgroundColor").default(""))
            .field(FieldSpec::string("gradient").default(""))
            .field(FieldSpec::integer("borderRadius").default(8).range(0.0, 50.0).clamp())
            .field(FieldSpec::structured("style").default(json!({})))
            .field(FieldSpec::string("className").default(""))
            .build()?;
        Ok(Self { schema })
    }
}

impl Component for InteractiveCounter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn title(&self) -> &'static str {
        "Interactive Counter"
    }

    fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    fn check(&self, attributes: &AttributeSet) -> Result<(), Vec<ValidationError>> {
        let (min, max) = (attributes.integer("minValue"), attributes.integer("maxValue"));
        if min > max {
            return Err(vec![ValidationError::new(
                "minValue",
                Rule::Min,
                format!("minimum {min} is above maximum {max}"),
            )]);
        }
        Ok(())
    }

    fn view(&self, attributes: &AttributeSet, _inner: Option<&str>) -> Element {
        let (min, max) = (attributes.integer("minValue"), attributes.integer("maxValue"));
        // Shown as the view store will hold it once attached
        let value = clamp(attributes.integer("initialValue"), min, max);
        let radius = attributes.integer("borderRadius");

        let mut outer = Style::new();
        outer.push("text-align", attributes.string("textAlign"));
        if radius > 0 {
            outer.push_px("border-radius", radius);
        }
        outer
            .push("background-color", attributes.string("backgroundColor"))
            .push("background", attributes.string("gradient"))
            .extend_structured(attributes.structured("style"));

        let variants = [
            format!("counter-style-{}", attributes.string("counterStyle")),
            format!("button-style-{}", attributes.string("buttonStyle")),
            format!("animation-{}", attributes.string("animation")),
        ];

        let mut button_style = Style::new();
        button_style.push("background-color", attributes.string("buttonColor"));
        let button = |action: &str, label: &str, text: &str, disabled: bool| {
            Element::new("button")
                .attr("type", "button")
                .class(["counter-button".to_string(), format!("counter-{action}")])
                .when(disabled, |b| b.flag("disabled"))
                .style(&button_style)
                .attr("aria-label", label)
                .attr("data-cb-action", action)
                .text(text)
        };

        let controls = attributes.boolean("showControls").then(|| {
            Element::new("div")
                .class(["counter-controls"])
                .child(button(
                    "decrease",
                    "Decrease counter",
                    "\u{2212}",
                    value <= min,
                ))
                .child(button(
                    "increase",
                    "Increase counter",
                    "+",
                    value >= max,
                ))
                .when(attributes.boolean("showReset"), |c| {
                    c.child(button("reset", "Reset counter", "Reset", false))
                })
        });

        wrapper(Self::NAME, variants, attributes.string("className"))
            .style(&outer)
            .child(
                Element::new("h3")
                    .class([LABEL_CLASS])
                    .style(&color(attributes, "labelColor"))
                    .rich_text(attributes.string("label")),
            )
            .child(
                Element::new("div")
                    .class(["counter-value"])
                    .style(&color(attributes, "valueColor"))
                    .attr("aria-live", "polite")
                    .text(value.to_string()),
            )
            .maybe_child(controls)
    }

    fn inspector(&self, attributes: &AttributeSet) -> Inspector {
        let min = attributes.integer("minValue") as f64;
        let max = attributes.integer("maxValue") as f64;
        let limit = VALUE_LIMIT as f64;
        let number = |min: f64, max: f64| Widget::Number { min, max, step: 1.0 };

        let mut counter = vec![
            Control::new("initialValue", "Initial Value", number(min, max)),
            Control::new("step", "Step Value", number(1.0, 100.0)),
            Control::new("minValue", "Minimum Value", number(-limit, max)),
            Control::new("maxValue", "Maximum Value", number(min, limit)),
            Control::new("showControls", "Show Controls", Widget::Toggle),
            Control::new("showReset", "Show Reset Button", Widget::Toggle),
            Control::new("autoIncrement", "Auto Increment", Widget::Toggle),
        ];
        if attributes.boolean("autoIncrement") {
            counter.push(Control::new(
                "autoIncrementInterval",
                "Auto Increment Interval (ms)",
                Widget::Range {
                    min: 100.0,
                    max: 10_000.0,
                    step: 100.0,
                },
            ));
        }

        Inspector {
            toolbar: vec![Control::new("textAlign", "Alignment", Widget::Alignment)],
            panels: vec![
                Panel::new("Counter Settings", counter),
                Panel::new(
                    "Style Settings",
                    vec![
                        Control::new("counterStyle", "Counter Style", Widget::Select { options: titled(COUNTER_STYLES) }),
                        Control::new("buttonStyle", "Button Style", Widget::Select { options: titled(BUTTON_STYLES) }),
                        Control::new("animation", "Animation", Widget::Select { options: titled(ANIMATIONS) }),
                        Control::new(
                            "borderRadius",
                            "Border Radius",
                            Widget::Range {
                                min: 0.0,
                                max: 50.0,
                                step: 1.0,
                            },
                        ),
                    ],
                ),
                Panel::new(
                    "Color Settings",
                    vec![
                        Control::new("labelColor", "Label Color", Widget::Color),
                        Control::new("valueColor", "Value Color", Widget::Color),
                        Control::new("buttonColor", "Button Color", Widget::Color),
                        Control::new("backgroundColor", "Background Color", Widget::Color),
                        Control::new("gradient", "Background Gradient", Widget::Text { multiline: false }),
                    ],
                ),
                Panel::new(
                    "Advanced Settings",
                    vec![
                        Control::new("className", "Custom CSS Class", Widget::Text { multiline: false })
                            .help("Add custom CSS classes for additional styling."),
                    ],
                )
                .collapsed(),
            ],
        }
    }

    fn interactive(&self) -> Option<&'static str> {
        Some(NAMESPACE)
    }
}
