mod youtube;

pub use playback_queue::VideoId;
pub use youtube::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub video_id: VideoId,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub published_at: String,
    pub channel_title: String,
}

pub type Videos = Vec<Video>;
