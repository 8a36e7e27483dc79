pub mod dashboard;
pub mod info;
pub mod input;
pub mod layout;
pub mod login;
pub mod request;
pub mod terminal_guard;
pub mod track;

pub use dashboard::Dashboard;
pub use login::LoginView;
pub use request::RequestView;
pub use track::TrackView;
