pub mod placeholder;
pub mod profile_service;
pub mod question_service;
pub mod video_service;
pub mod visualization_service;

pub use placeholder::create_placeholder_image;
pub use profile_service::ProfileService;
pub use question_service::QuestionService;
pub use video_service::VideoService;
pub use visualization_service::VisualizationService;
