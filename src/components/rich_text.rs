use leptos::prelude::*;

use crate::models::post::{ContentBlock, RichTextSegment};

fn is_list_item(kind: &str) -> bool {
    kind == "list-item" || kind == "o-list-item"
}

fn render_segment(segment: RichTextSegment) -> AnyView {
    let RichTextSegment { kind, text, url, alt } = segment;
    match kind.as_str() {
        "heading1" => view! { <h1>{text}</h1> }.into_any(),
        "heading2" => view! { <h2>{text}</h2> }.into_any(),
        "heading3" => view! { <h3>{text}</h3> }.into_any(),
        "heading4" => view! { <h4>{text}</h4> }.into_any(),
        "heading5" => view! { <h5>{text}</h5> }.into_any(),
        "heading6" => view! { <h6>{text}</h6> }.into_any(),
        "preformatted" => view! { <pre>{text}</pre> }.into_any(),
        "image" => match url {
            Some(src) => {
                let alt = alt.unwrap_or_default();
                view! { <img src=src alt=alt/> }.into_any()
            }
            None => ().into_any(),
        },
        _ => view! { <p>{text}</p> }.into_any(),
    }
}

/// Render block-level rich text. Consecutive list items of the same kind are
/// grouped into one `<ul>` or `<ol>`; inline spans are not interpreted.
pub fn render_rich_text(segments: Vec<RichTextSegment>) -> Vec<AnyView> {
    let mut views = Vec::new();
    let mut segments = segments.into_iter().peekable();

    while let Some(segment) = segments.next() {
        if !is_list_item(&segment.kind) {
            views.push(render_segment(segment));
            continue;
        }

        let kind = segment.kind;
        let mut items = vec![segment.text];
        while let Some(next) = segments.next_if(|s| s.kind == kind) {
            items.push(next.text);
        }

        let items = items
            .into_iter()
            .map(|text| view! { <li>{text}</li> })
            .collect_view();
        if kind == "o-list-item" {
            views.push(view! { <ol>{items}</ol> }.into_any());
        } else {
            views.push(view! { <ul>{items}</ul> }.into_any());
        }
    }

    views
}

/// One content block: an optional heading followed by its body.
#[component]
pub fn ContentSection(block: ContentBlock) -> impl IntoView {
    let ContentBlock { heading, body } = block;
    view! {
        <section class="block">
            {heading.map(|heading| view! { <h2>{heading}</h2> })}
            <div class="body">{render_rich_text(body)}</div>
        </section>
    }
}
