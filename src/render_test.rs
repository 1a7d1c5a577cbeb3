use super::*;
use crate::message::Message;

fn msg(id: u64, name: &str, body: &str, can_delete: bool) -> Message {
    Message {
        id: MessageId::from(id),
        display_name: name.to_owned(),
        created_at: "10:00".to_owned(),
        body: body.to_owned(),
        can_delete,
        is_highlighted: false,
    }
}

// =============================================================================
// render
// =============================================================================

#[test]
fn render_failed_is_error_without_count() {
    let content = render(&FetchOutcome::Failed);
    assert_eq!(content, PanelContent::Error);
    assert_eq!(content.count(), None);
}

#[test]
fn render_empty_list_is_placeholder_with_zero_count() {
    let content = render(&FetchOutcome::Loaded(Vec::new()));
    assert_eq!(content, PanelContent::Empty);
    assert_eq!(content.count(), Some(0));
}

#[test]
fn render_keeps_server_order_one_block_per_message() {
    let list = vec![msg(3, "Cy", "third", false), msg(1, "Ana", "first", true), msg(2, "Bo", "second", false)];
    let content = render(&FetchOutcome::Loaded(list));
    let PanelContent::Messages(blocks) = &content else {
        panic!("expected message blocks, got {content:?}");
    };
    let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["3", "1", "2"]);
    assert_eq!(content.count(), Some(3));
    assert!(blocks[1].deletable);
    assert!(!blocks[0].deletable);
}

#[test]
fn render_is_deterministic() {
    let list = vec![msg(1, "Ana", "hi", true)];
    assert_eq!(render(&FetchOutcome::Loaded(list.clone())), render(&FetchOutcome::Loaded(list)));
}

// =============================================================================
// to_html
// =============================================================================

#[test]
fn html_escapes_body_but_not_trusted_fields() {
    let mut m = msg(1, "<em>Ana</em>", "<script>alert('x')</script> & more", false);
    m.created_at = "<i>now</i>".to_owned();
    let html = render(&FetchOutcome::Loaded(vec![m])).to_html();

    assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt; &amp; more"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("<em>Ana</em>"));
    assert!(html.contains("<i>now</i>"));
}

#[test]
fn html_carries_id_and_delete_affordance_only_when_allowed() {
    let html = render(&FetchOutcome::Loaded(vec![msg(1, "Ana", "hi", true), msg(2, "Bo", "yo", false)])).to_html();

    assert!(html.contains("data-message-id=\"1\""));
    assert!(html.contains("data-message-id=\"2\""));
    assert_eq!(html.matches("class=\"delete-message\"").count(), 1);
    assert_eq!(html.matches("<div class=\"chat-message\"").count(), 2);
}

#[test]
fn html_marks_highlighted_messages() {
    let mut m = msg(5, "Ana", "pinned", false);
    m.is_highlighted = true;
    let html = render(&FetchOutcome::Loaded(vec![m])).to_html();
    assert!(html.contains("chat-message--highlighted"));
}

#[test]
fn html_placeholder_and_error_notice() {
    assert!(PanelContent::Empty.to_html().contains(EMPTY_TEXT));
    let error = PanelContent::Error.to_html();
    assert!(error.contains(ERROR_TEXT));
    assert!(error.contains("role=\"alert\""));
}

// =============================================================================
// escape_html
// =============================================================================

#[test]
fn escape_html_leaves_plain_text_alone() {
    assert_eq!(escape_html("hola, què tal?"), "hola, què tal?");
}

#[test]
fn escape_html_handles_attribute_quotes() {
    assert_eq!(escape_html("a\"b'c"), "a&quot;b&#x27;c");
}
