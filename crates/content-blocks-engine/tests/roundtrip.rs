use content_blocks_engine::{
    EditableInstance, EditingSession, Registry, deserialize, parse_document, serialize,
    serialize_document,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn registry() -> Registry {
    Registry::with_blocks().unwrap()
}

fn create(registry: &Registry, component: &str, raw: Value) -> EditableInstance {
    let component = registry.get(component).unwrap();
    EditableInstance::create_with(component, raw.as_object().unwrap()).unwrap()
}

fn assert_same_tree(a: &EditableInstance, b: &EditableInstance) {
    assert_eq!(a.name(), b.name());
    assert_eq!(a.attributes(), b.attributes());
    assert_eq!(a.children().len(), b.children().len());
    for (a, b) in a.children().iter().zip(b.children()) {
        assert_same_tree(a, b);
    }
}

#[rstest]
#[case::text_defaults("basic-text", json!({}))]
#[case::text_styled("basic-text", json!({
    "content": "Line one<br>with <a href=\"https://example.com/?q=a b\" target=\"_blank\">a link</a> &amp; more",
    "textAlign": "right",
    "fontSize": "small",
    "backgroundColor": "rgb(1, 2, 3)",
    "lineHeight": 0.75,
    "style": {"fontWeight": "600"},
    "className": "lead wide",
}))]
#[case::text_trailing_space_in_block("basic-text", json!({"content": "<div>hello </div>"}))]
#[case::text_space_after_script("basic-text", json!({"content": "<script>x</script> hi"}))]
#[case::text_leading_nbsp("basic-text", json!({"content": "&nbsp;indented"}))]
#[case::card_defaults("advanced-card", json!({}))]
#[case::card_full("advanced-card", json!({
    "title": "A <em>card</em>",
    "subtitle": "Shown below",
    "imageUrl": "https://example.com/photo.jpg",
    "imageAlt": "A \"quoted\" photo",
    "imageId": 42,
    "cardStyle": "elevated",
    "imagePosition": "left",
    "cardLayout": "horizontal",
    "borderRadius": 0,
    "shadow": "large",
    "linkUrl": "/posts/1",
    "linkTarget": "_blank",
    "rel": "noopener noreferrer",
}))]
#[case::card_hidden_subtitle("advanced-card", json!({"subtitle": "Kept", "showSubtitle": false, "showImage": false}))]
#[case::counter_defaults("interactive-counter", json!({}))]
#[case::counter_tuned("interactive-counter", json!({
    "label": "Visitors <strong>today</strong>",
    "initialValue": -7,
    "step": 5,
    "minValue": -50,
    "maxValue": 50,
    "autoIncrement": true,
    "autoIncrementInterval": 2500,
    "showReset": false,
    "counterStyle": "gradient",
    "buttonStyle": "outlined",
    "animation": "bounce",
    "gradient": "linear-gradient(45deg, #fff, #000)",
}))]
#[case::counter_value_above_max("interactive-counter", json!({"initialValue": 50, "minValue": 0, "maxValue": 10}))]
fn attributes_survive_a_round_trip(registry: Registry, #[case] component: &str, #[case] raw: Value) {
    let instance = create(&registry, component, raw);
    let fragment = serialize(&instance);

    let loaded = deserialize(fragment.as_str(), &registry).unwrap();

    assert_same_tree(&instance, &loaded);
    assert_eq!(serialize(&loaded), fragment);
}

#[rstest]
fn nested_children_survive_a_round_trip(registry: Registry) {
    let mut card = create(&registry, "advanced-card", json!({"title": "Parent"}));
    card.insert_child(0, create(&registry, "basic-text", json!({"content": "first"})))
        .unwrap();
    card.insert_child(1, create(&registry, "interactive-counter", json!({"initialValue": 2})))
        .unwrap();

    let fragment = serialize(&card);
    let loaded = deserialize(fragment.as_str(), &registry).unwrap();

    assert_same_tree(&card, &loaded);
    assert_eq!(serialize(&loaded), fragment);
}

#[rstest]
fn documents_survive_a_round_trip(registry: Registry) {
    let instances = vec![
        create(&registry, "basic-text", json!({"content": "intro"})),
        create(&registry, "interactive-counter", json!({"maxValue": 3})),
        create(&registry, "advanced-card", json!({"title": "outro"})),
    ];
    let text = serialize_document(&instances);

    let loaded: Vec<_> = parse_document(&text, &registry)
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(loaded.len(), 3);
    for (a, b) in instances.iter().zip(&loaded) {
        assert_same_tree(a, b);
    }
    assert_eq!(serialize_document(&loaded), text);

    let session = EditingSession::load(registry, &text).unwrap();
    assert_eq!(session.save(), text);
}
