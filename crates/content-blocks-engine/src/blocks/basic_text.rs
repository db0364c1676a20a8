use serde_json::json;

use super::{ALIGNMENTS, wrapper};
use crate::component::{Component, Control, Inspector, Panel, Widget};
use crate::markup::{Element, Style};
use crate::schema::{AttributeSchema, AttributeSet, FieldSpec, SchemaBuilder, SchemaError};

pub const CONTENT_CLASS: &str = "basic-text-content";

const FONT_SIZES: &[(&str, &str)] = &[
    ("Small", "small"),
    ("Medium", "medium"),
    ("Large", "large"),
    ("Extra Large", "x-large"),
];

/// A rich-text paragraph.
#[derive(Debug)]
pub struct BasicText {
    schema: AttributeSchema,
}

impl BasicText {
    pub const NAME: &'static str = "basic-text";

    pub fn new() -> Result<Self, SchemaError> {
        let sizes: Vec<&str> = FONT_SIZES.iter().map(|(_, v)| *v).collect();
        let schema = SchemaBuilder::new()
            .field(FieldSpec::string("content").default("").rich_text().markup(CONTENT_CLASS))
            .field(FieldSpec::enumeration("textAlign", ALIGNMENTS).default("left"))
            .field(FieldSpec::enumeration("fontSize", &sizes).default("medium"))
            .field(FieldSpec::string("textColor").default(""))
            .field(FieldSpec::string("backgroundColor").default(""))
            .field(FieldSpec::string("gradient").default(""))
            .field(FieldSpec::number("lineHeight").default(1.5).range(0.5, 3.0).clamp())
            .field(FieldSpec::boolean("dropCap").default(false))
            .field(FieldSpec::structured("style").default(json!({})))
            .field(FieldSpec::string("className").default(""))
            .build()?;
        Ok(Self { schema })
    }
}

impl Component for BasicText {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn title(&self) -> &'static str {
        "Basic Text"
    }

    fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    fn view(&self, attributes: &AttributeSet, _inner: Option<&str>) -> Element {
        let mut outer = Style::new();
        outer
            .push("text-align", attributes.string("textAlign"))
            .extend_structured(attributes.structured("style"));

        let mut text = Style::new();
        text.push("color", attributes.string("textColor"))
            .push("background-color", attributes.string("backgroundColor"))
            .push("background", attributes.string("gradient"))
            .push("line-height", &attributes.number("lineHeight").to_string());

        let mut classes = vec![
            CONTENT_CLASS.to_string(),
            format!("has-text-align-{}", attributes.string("textAlign")),
            format!("has-{}-font-size", attributes.string("fontSize")),
        ];
        if attributes.boolean("dropCap") {
            classes.push("has-drop-cap".to_string());
        }

        wrapper(Self::NAME, [], attributes.string("className"))
            .style(&outer)
            .child(
                Element::new("p")
                    .class(classes)
                    .style(&text)
                    .rich_text(attributes.string("content")),
            )
    }

    fn inspector(&self, _attributes: &AttributeSet) -> Inspector {
        Inspector {
            toolbar: vec![Control::new("textAlign", "Alignment", Widget::Alignment)],
            panels: vec![
                Panel::new(
                    "Text Settings",
                    vec![
                        Control::new("fontSize", "Font Size", Widget::select(FONT_SIZES)),
                        Control::new("textColor", "Text Color", Widget::Color),
                        Control::new("backgroundColor", "Background Color", Widget::Color),
                        Control::new("gradient", "Gradient", Widget::Text { multiline: false }),
                    ],
                ),
                Panel::new(
                    "Advanced Settings",
                    vec![
                        Control::new("className", "Custom CSS Class", Widget::Text { multiline: false })
                            .help("Add custom CSS classes for additional styling."),
                        Control::new(
                            "lineHeight",
                            "Line Height",
                            Widget::Number {
                                min: 0.5,
                                max: 3.0,
                                step: 0.1,
                            },
                        ),
                        Control::new("dropCap", "Enable Drop Cap", Widget::Toggle)
                            .help("Add a decorative first letter."),
                    ],
                )
                .collapsed(),
            ],
        }
    }
}
