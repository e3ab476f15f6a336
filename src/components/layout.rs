use leptos::prelude::*;

/// Serialize a page view into a complete HTML document.
pub fn render_document<V: RenderHtml>(page: V) -> String {
    let mut html = String::from("<!DOCTYPE html>");
    html.push_str(&page.to_html());
    html
}

/// Document shell shared by every page.
#[component]
pub fn Layout(title: String, children: Children) -> impl IntoView {
    view! {
        <html lang="pt-BR">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <link rel="stylesheet" href="/styles/common.css"/>
            </head>
            <body>
                <header class="header">
                    <a href="/">
                        <img src="/images/logo.svg" alt="logo"/>
                    </a>
                </header>
                {children()}
            </body>
        </html>
    }
}

/// Link shown while a preview marker is active.
#[component]
pub fn ExitPreview() -> impl IntoView {
    view! {
        <aside>
            <a class="exit-preview" href="/api/exit-preview">"Sair do modo Preview"</a>
        </aside>
    }
}
