use serde_json::{Map, Value, json};

use super::{ALIGNMENTS, color, titled, wrapper};
use crate::component::{Component, Control, Inspector, MediaPicker, MediaType, Panel, Widget};
use crate::editing::{Change, EditError, EditableInstance};
use crate::markup::{Element, Style};
use crate::schema::{AttributeSchema, AttributeSet, FieldSpec, SchemaBuilder, SchemaError};

pub const TITLE_CLASS: &str = "card-title";
pub const SUBTITLE_CLASS: &str = "card-subtitle";
pub const CONTENT_CLASS: &str = "card-content";

const CARD_STYLES: &[&str] = &["default", "minimal", "elevated", "outlined", "gradient"];
const LAYOUTS: &[&str] = &["vertical", "horizontal"];
const IMAGE_POSITIONS: &[&str] = &["top", "bottom", "left", "right"];
const SHADOWS: &[&str] = &["none", "small", "medium", "large"];
const HOVER_EFFECTS: &[&str] = &["none", "lift", "glow", "scale"];
const LINK_TARGETS: &[(&str, &str)] = &[("Same Window", "_self"), ("New Window", "_blank")];

/// A card with title, subtitle, optional image and link, and nested blocks.
#[derive(Debug)]
pub struct AdvancedCard {
    schema: AttributeSchema,
}

impl AdvancedCard {
    pub const NAME: &'static str = "advanced-card";

    pub fn new() -> Result<Self, SchemaError> {
        let targets: Vec<&str> = LINK_TARGETS.iter().map(|(_, v)| *v).collect();
        let schema = SchemaBuilder::new()
            .field(FieldSpec::string("title").default("").rich_text().markup(TITLE_CLASS))
            .field(FieldSpec::string("subtitle").default("").rich_text().markup(SUBTITLE_CLASS))
            .field(FieldSpec::string("imageUrl").default("").url())
            .field(FieldSpec::string("imageAlt").default(""))
            .field(FieldSpec::integer("imageId").default(0))
            .field(FieldSpec::enumeration("cardStyle", CARD_STYLES).default("default"))
            .field(FieldSpec::boolean("showImage").default(true))
            .field(FieldSpec::boolean("showSubtitle").default(true))
            .field(FieldSpec::enumeration("imagePosition", IMAGE_POSITIONS).default("top"))
            .field(FieldSpec::enumeration("cardLayout", LAYOUTS).default("vertical"))
            .field(FieldSpec::enumeration("textAlign", ALIGNMENTS).default("left"))
            .field(FieldSpec::string("titleColor").default(""))
            .field(FieldSpec::string("subtitleColor").default(""))
            .field(FieldSpec::string("backgroundColor").default(""))
            .field(FieldSpec::string("gradient").default(""))
            .field(FieldSpec::integer("borderRadius").default(8).range(0.0, 50.0).clamp())
            .field(FieldSpec::enumeration("shadow", SHADOWS).default("small"))
            .field(FieldSpec::enumeration("hoverEffect", HOVER_EFFECTS).default("none"))
            .field(FieldSpec::string("linkUrl").default("").url())
            .field(FieldSpec::enumeration("linkTarget", &targets).default("_self"))
            .field(FieldSpec::string("rel").default("").pattern(r"^[A-Za-z \-]*$"))
            .field(FieldSpec::structured("style").default(json!({})))
            .field(FieldSpec::string("className").default(""))
            .build()?;
        Ok(Self { schema })
    }
}

impl Component for AdvancedCard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn title(&self) -> &'static str {
        "Advanced Card"
    }

    fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    fn view(&self, attributes: &AttributeSet, inner: Option<&str>) -> Element {
        let radius = attributes.integer("borderRadius");
        let mut outer = Style::new();
        outer
            .push("text-align", attributes.string("textAlign"))
            .push_px("border-radius", radius)
            .push("background-color", attributes.string("backgroundColor"))
            .push("background", attributes.string("gradient"))
            .extend_structured(attributes.structured("style"));

        let variants = [
            format!("card-style-{}", attributes.string("cardStyle")),
            format!("card-layout-{}", attributes.string("cardLayout")),
            format!("shadow-{}", attributes.string("shadow")),
            format!("hover-{}", attributes.string("hoverEffect")),
        ];

        let image_url = attributes.string("imageUrl");
        let image = (attributes.boolean("showImage") && !image_url.is_empty()).then(|| {
            let mut rounded = Style::new();
            rounded.push_px("border-radius", radius);
            Element::new("div")
                .class([
                    "card-image".to_string(),
                    format!("image-position-{}", attributes.string("imagePosition")),
                ])
                .child(
                    Element::new("img")
                        .url_attr("src", image_url)
                        .attr("alt", attributes.string("imageAlt"))
                        .style(&rounded),
                )
        });

        // The subtitle stays in the markup when hidden so it survives a save
        let body = Element::new("div")
            .class(["card-body"])
            .child(
                Element::new("h3")
                    .class([TITLE_CLASS])
                    .style(&color(attributes, "titleColor"))
                    .rich_text(attributes.string("title")),
            )
            .child(
                Element::new("p")
                    .class([SUBTITLE_CLASS])
                    .when(!attributes.boolean("showSubtitle"), |p| p.flag("hidden"))
                    .style(&color(attributes, "subtitleColor"))
                    .rich_text(attributes.string("subtitle")),
            )
            .child(
                Element::new("div")
                    .class([CONTENT_CLASS])
                    .raw(inner.unwrap_or_default()),
            );

        let link_url = attributes.string("linkUrl");
        let card = wrapper(Self::NAME, variants, attributes.string("className")).style(&outer);
        if link_url.is_empty() {
            card.maybe_child(image).child(body)
        } else {
            let rel = attributes.string("rel");
            let link = Element::new("a")
                .url_attr("href", link_url)
                .attr("target", attributes.string("linkTarget"))
                .when(!rel.is_empty(), |a| a.attr("rel", rel))
                .maybe_child(image)
                .child(body);
            card.child(link)
        }
    }

    fn inspector(&self, attributes: &AttributeSet) -> Inspector {
        let show_image = attributes.boolean("showImage");
        let show_subtitle = attributes.boolean("showSubtitle");

        let mut content = vec![
            Control::new("showImage", "Show Image", Widget::Toggle),
            Control::new("showSubtitle", "Show Subtitle", Widget::Toggle),
        ];
        if show_image {
            content.push(Control::new(
                "imagePosition",
                "Image Position",
                Widget::Select {
                    options: titled(IMAGE_POSITIONS),
                },
            ));
            content.push(Control::new(
                "imageId",
                "Card Image",
                Widget::Media {
                    allowed: vec![MediaType::Image],
                },
            ));
        }
        content.extend([
            Control::new("linkUrl", "Link URL", Widget::Text { multiline: false })
                .help("Make the entire card clickable by adding a link URL."),
            Control::new("linkTarget", "Link Target", Widget::select(LINK_TARGETS)),
            Control::new("rel", "Rel Attribute", Widget::Text { multiline: false })
                .help("Add rel attributes for security and SEO."),
        ]);

        let mut colors = vec![Control::new("titleColor", "Title Color", Widget::Color)];
        if show_subtitle {
            colors.push(Control::new("subtitleColor", "Subtitle Color", Widget::Color));
        }
        colors.extend([
            Control::new("backgroundColor", "Background Color", Widget::Color),
            Control::new("gradient", "Background Gradient", Widget::Text { multiline: false }),
        ]);

        Inspector {
            toolbar: vec![Control::new("textAlign", "Alignment", Widget::Alignment)],
            panels: vec![
                Panel::new("Content Settings", content),
                Panel::new(
                    "Layout Settings",
                    vec![
                        Control::new("cardStyle", "Card Style", Widget::Select { options: titled(CARD_STYLES) }),
                        Control::new("cardLayout", "Card Layout", Widget::Select { options: titled(LAYOUTS) }),
                        Control::new(
                            "borderRadius",
                            "Border Radius",
                            Widget::Range {
                                min: 0.0,
                                max: 50.0,
                                step: 1.0,
                            },
                        ),
                        Control::new("shadow", "Shadow", Widget::Select { options: titled(SHADOWS) }),
                        Control::new("hoverEffect", "Hover Effect", Widget::Select { options: titled(HOVER_EFFECTS) }),
                    ],
                ),
                Panel::new("Color Settings", colors),
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

    fn children_slot(&self) -> Option<&'static str> {
        Some(CONTENT_CLASS)
    }

    fn allowed_children(&self) -> &[&'static str] {
        &[super::BasicText::NAME, super::InteractiveCounter::NAME]
    }
}

/// Ask the host media service for an image and store the selection with a
/// single update. `Ok(None)` when the picker was dismissed.
pub fn pick_image(
    picker: &mut dyn MediaPicker,
    card: &mut EditableInstance,
) -> Result<Option<Change>, EditError> {
    let Some(selection) = picker.pick(&[MediaType::Image]) else {
        return Ok(None);
    };
    let mut raw = Map::new();
    raw.insert("imageId".into(), selection.id.into());
    raw.insert("imageUrl".into(), selection.url.into());
    raw.insert("imageAlt".into(), selection.alt.into());
    card.update(&raw).map(Some)
}

/// Clear the image fields back to their defaults.
pub fn remove_image(card: &mut EditableInstance) -> Result<Change, EditError> {
    let raw: Map<String, Value> = ["imageId", "imageUrl", "imageAlt"]
        .into_iter()
        .map(|k| (k.to_string(), Value::Null))
        .collect();
    card.update(&raw)
}
