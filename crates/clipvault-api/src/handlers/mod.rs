pub mod video_stream;
pub mod video_upload;
pub mod videos;
