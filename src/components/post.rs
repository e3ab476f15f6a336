use leptos::prelude::*;

use crate::components::layout::{render_document, ExitPreview, Layout};
use crate::components::rich_text::ContentSection;
use crate::models::post::{ContentDetail, Neighbor};
use crate::pages::post::PostView;
use crate::rendering::dates::{edited_label, format_date};

const UTTERANCES_SCRIPT: &str = "https://utteranc.es/client.js";

#[component]
fn NeighborLink(neighbor: Neighbor, label: &'static str, css_class: &'static str) -> impl IntoView {
    let href = format!("/post/{}", neighbor.uid);
    view! {
        <a class=css_class href=href>
            <span>{neighbor.title}</span>
            <strong>{label}</strong>
        </a>
    }
}

/// utterances widget keyed on the page path.
#[component]
fn Comments(repo: String) -> impl IntoView {
    let script = format!(
        r#"<script src="{UTTERANCES_SCRIPT}" repo="{}" issue-term="pathname" theme="github-dark" crossorigin="anonymous" async></script>"#,
        html_escape::encode_double_quoted_attribute(&repo)
    );
    view! { <section class="comments" inner_html=script></section> }
}

#[component]
pub fn PostPage(page: PostView, preview: bool, comments_repo: Option<String>) -> impl IntoView {
    let PostView {
        post,
        navigation,
        reading_time_minutes,
    } = page;
    let published = post.first_published_at.as_ref().map(format_date);
    let edited = post.edited_at().as_ref().map(edited_label);
    let reading_time = format!("{reading_time_minutes} min");
    let ContentDetail {
        title,
        author,
        banner_url,
        content,
        ..
    } = post;

    view! {
        {banner_url.map(|src| view! { <img class="banner" src=src alt="banner"/> })}
        <main class="container">
            <article class="post">
                <h1>{title}</h1>
                <ul class="info">
                    <li>
                        <img src="/images/calendar.svg" alt="calendário"/>
                        <time>{published}</time>
                    </li>
                    <li>
                        <img src="/images/user.svg" alt="autor"/>
                        <span>{author}</span>
                    </li>
                    <li>
                        <img src="/images/clock.svg" alt="tempo de leitura"/>
                        <span>{reading_time}</span>
                    </li>
                </ul>
                {edited.map(|label| view! { <p class="edited">{label}</p> })}
                {content
                    .into_iter()
                    .map(|block| view! { <ContentSection block=block/> })
                    .collect_view()}
            </article>
            <footer>
                <nav class="navigation">
                    {navigation.previous.map(|neighbor| view! {
                        <NeighborLink neighbor=neighbor label="Post anterior" css_class="previous"/>
                    })}
                    {navigation.next.map(|neighbor| view! {
                        <NeighborLink neighbor=neighbor label="Próximo post" css_class="next"/>
                    })}
                </nav>
                {comments_repo.map(|repo| view! { <Comments repo=repo/> })}
                {preview.then(|| view! { <ExitPreview/> })}
            </footer>
        </main>
    }
}

/// Render a post page as a full HTML document.
pub fn render_post_page(
    page: PostView,
    preview: bool,
    comments_repo: Option<String>,
) -> String {
    let title = page.post.title.clone();
    render_document(view! {
        <Layout title=title>
            <PostPage page=page preview=preview comments_repo=comments_repo/>
        </Layout>
    })
}
