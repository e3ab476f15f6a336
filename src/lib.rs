pub mod app;
pub mod cache;
pub mod error;
pub mod export;
pub mod settings;
pub mod content {
    pub mod client;
    pub mod models;
    pub mod predicate;
}
pub mod models {
    pub mod post;
}
pub mod pages {
    pub mod listing;
    pub mod post;
}
pub mod preview {
    pub mod links;
    pub mod marker;
    pub mod session;
}
pub mod rendering {
    pub mod dates;
}
pub mod components {
    pub mod home;
    pub mod layout;
    pub mod post;
    pub mod rich_text;
}
pub mod api {
    pub mod errors;
    pub mod pages;
    pub mod posts;
    pub mod preview;
}
