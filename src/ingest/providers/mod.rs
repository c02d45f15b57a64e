pub mod google_news;

pub use google_news::GoogleNewsFetcher;
