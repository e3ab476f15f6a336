use leptos::prelude::*;

use crate::components::layout::{render_document, ExitPreview, Layout};
use crate::models::post::ContentSummary;
use crate::pages::listing::{ChunkLinks, PostsPage};
use crate::rendering::dates::format_date;

/// A listed post linking to its page.
#[component]
pub fn PostCard(summary: ContentSummary) -> impl IntoView {
    let ContentSummary {
        uid,
        first_published_at,
        title,
        subtitle,
        author,
    } = summary;
    let href = format!("/post/{uid}");
    let published = first_published_at.as_ref().map(format_date);

    view! {
        <a class="post" href=href>
            <strong>{title}</strong>
            <p>{subtitle}</p>
            <ul class="info">
                <li>
                    <img src="/images/calendar.svg" alt="calendário"/>
                    <time>{published}</time>
                </li>
                <li>
                    <img src="/images/user.svg" alt="autor"/>
                    <span>{author}</span>
                </li>
            </ul>
        </a>
    }
}

/// The listing. `next_chunk` is the URL the load-more script fetches next.
#[component]
pub fn HomePage(page: PostsPage, next_chunk: Option<String>, preview: bool) -> impl IntoView {
    let results = page.results;

    view! {
        <main class="container">
            <div class="posts" id="posts">
                {results
                    .into_iter()
                    .map(|summary| view! { <PostCard summary=summary/> })
                    .collect_view()}
            </div>
            {next_chunk.map(|link| view! {
                <button id="load-more" class="load-more" type="button" data-next-chunk=link>
                    "Carregar mais posts"
                </button>
            })}
            {preview.then(|| view! { <ExitPreview/> })}
        </main>
        <script src="/js/load-more.js"></script>
    }
}

/// Render the listing page as a full HTML document.
///
/// The first page is page 1, so the load-more control links to page 2.
pub fn render_home_page(
    site_title: &str,
    page: PostsPage,
    links: ChunkLinks,
    preview: bool,
) -> String {
    let title = site_title.to_string();
    let next_chunk = page.next_page.as_deref().map(|cursor| links.link(2, cursor));
    render_document(view! {
        <Layout title=title>
            <HomePage page=page next_chunk=next_chunk preview=preview/>
        </Layout>
    })
}

/// Render cards only, for appending to an existing listing.
pub fn render_post_cards(summaries: Vec<ContentSummary>) -> String {
    summaries
        .into_iter()
        .map(|summary| view! { <PostCard summary=summary/> })
        .collect_view()
        .to_html()
}
