use placard::{render, render_json, RenderIssue, TemplateEngine, Value};
use serde_json::json;

// ── Author mistakes must never break a live preview ──

#[test]
fn each_without_closer_is_left_as_written() {
    let template = "{{#each foo}}bar";
    let rendered = render_json(template, &json!({"foo": [1, 2]}));
    assert_eq!(rendered, "{{#each foo}}bar");
}

#[test]
fn if_without_closer_is_left_as_written() {
    let template = "A{{@if show}}B{{name}}";
    let rendered = render_json(template, &json!({"show": true, "name": "x"}));
    assert_eq!(rendered, "A{{@if show}}B{{name}}");
}

#[test]
fn variables_before_an_unmatched_block_still_render() {
    let template = "{{name}}: {{#each xs}}{{name}}";
    let rendered = render_json(template, &json!({"name": "N", "xs": []}));
    assert_eq!(rendered, "N: {{#each xs}}{{name}}");
}

#[test]
fn unterminated_opener_tag_is_literal() {
    let template = "x {{@if a and more text";
    assert_eq!(render_json(template, &json!({"a": true})), template);
}

#[test]
fn unmatched_first_if_hides_later_if_blocks() {
    // Only the first opener of a kind is ever considered.
    let template = "{{@if a}}open {{@if b}}inner{{/if}}";
    let rendered = render_json(template, &json!({"a": true, "b": true}));
    assert_eq!(rendered, template);
}

#[test]
fn each_still_runs_after_an_unmatched_if() {
    let template = "{{#each xs}}{{@index}}{{/each}} {{@if a}}";
    let rendered = render_json(template, &json!({"xs": [1, 1], "a": true}));
    assert_eq!(rendered, "01 {{@if a}}");
}

#[test]
fn stray_closers_and_else_are_removed() {
    let template = "a{{/if}}b{{else}}c{{/each}}d";
    assert_eq!(render_json(template, &json!({})), "abcd");
}

#[test]
fn malformed_condition_checks_existence() {
    let template = "{{@if > 3}}yes{{else}}no{{/if}}";
    assert_eq!(render_json(template, &json!({"x": 5})), "no");
}

#[test]
fn malformed_condition_can_match_a_literal_key() {
    let template = "{{@if count >}}yes{{else}}no{{/if}}";
    assert_eq!(render_json(template, &json!({"count >": 1})), "yes");
}

#[test]
fn empty_condition_is_false() {
    let template = "{{@if  }}yes{{else}}no{{/if}}";
    assert_eq!(render_json(template, &json!({"": true})), "no");
    assert_eq!(render_json("{{@if }}A{{else}}B{{/if}}", &json!({})), "B");
}

// ── Values that do not fit where they are used ──

#[test]
fn each_over_object_renders_nothing() {
    let template = "[{{#each cfg}}x{{/each}}]";
    assert_eq!(render_json(template, &json!({"cfg": {"a": 1}})), "[]");
}

#[test]
fn each_over_string_renders_nothing() {
    let template = "[{{#each name}}x{{/each}}]";
    assert_eq!(render_json(template, &json!({"name": "abc"})), "[]");
}

#[test]
fn each_over_missing_path_renders_nothing() {
    let template = "A{{#each nope.nope}}x{{/each}}B";
    assert_eq!(render_json(template, &json!({})), "AB");
}

#[test]
fn null_and_missing_render_empty() {
    let template = "[{{a}}|{{b}}|{{c.d}}]";
    assert_eq!(render_json(template, &json!({"a": null})), "[||]");
}

#[test]
fn containers_render_in_plain_string_form() {
    let template = "{{list}} / {{obj}} / {{flag}} / {{ratio}}";
    let data = json!({"list": [1, "two", null], "obj": {"k": 1}, "flag": false, "ratio": 0.25});
    assert_eq!(render_json(template, &data), "1,two, / [object Object] / false / 0.25");
}

#[test]
fn metadata_outside_each_is_empty() {
    assert_eq!(render_json("{{@index}}{{@first}}", &json!({})), "");
}

#[test]
fn primitive_root_context_resolves_nothing() {
    assert_eq!(render("[{{length}}]", &Value::from("text")), "[]");
}

#[test]
fn special_characters_are_not_escaped() {
    let template = "{{content}}";
    let data = json!({"content": "Hello <world> & \"friends\""});
    assert_eq!(render_json(template, &data), "Hello <world> & \"friends\"");
}

#[test]
fn unicode_content_and_keys() {
    let template = "{{#each gäste}}{{name}} {{/each}}";
    let data = json!({"gäste": [{"name": "こんにちは"}, {"name": "🌍"}]});
    assert_eq!(render_json(template, &data), "こんにちは 🌍 ");
}

// ── Legacy guard and re-evaluation ──

#[test]
fn tag_naming_each_is_never_substituted() {
    let template = "{{ #each-like }}";
    assert_eq!(render_json(template, &json!({"#each-like": "x"})), template);
}

#[test]
fn values_spliced_by_each_are_processed_again() {
    let template = "{{#each xs}}{{snippet}}{{/each}}";
    let data = json!({"xs": [{"snippet": "{{@if flag}}on{{else}}off{{/if}}"}], "flag": true});
    assert_eq!(render_json(template, &data), "on");
}

#[test]
fn diagnostics_list_every_degradation_in_order() {
    let engine = TemplateEngine::default();
    let rendered = engine.render_with_diagnostics(
        "{{@if a >}}x{{/if}}{{#each s}}y{{/each}}{{missing}}{{#each t}}",
        &Value::from(json!({"s": "no"})),
    );
    assert_eq!(rendered.output, "{{#each t}}");
    assert_eq!(
        rendered.issues,
        vec![
            RenderIssue::MalformedCondition("a >".into()),
            RenderIssue::UnresolvedArray("s".into()),
            RenderIssue::UnmatchedBlock {
                directive: "#each",
                offset: 11
            },
            RenderIssue::UnresolvedPath("missing".into()),
        ]
    );
}
