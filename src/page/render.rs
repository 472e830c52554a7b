use crate::config::PageConfig;
use crate::utils::escape_html;
use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Tz;
use playback_queue::SearchResult;
use serde::Serialize;
use std::fmt::Write;

const INLINE_STYLES: &str = include_str!("page.css");
const GTAG_URL: &str = "https://www.googletagmanager.com/gtag/js";

#[derive(Debug, thiserror::Error)]
pub(crate) enum RenderError {
    #[error("Unable to serialize video data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unable to write page: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("UTC offset of {0} minutes is out of range")]
    InvalidUtcOffset(i32),
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

/// Zone used for the "Last video updated" timestamp.
enum DisplayZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// A fixed offset, when configured, overrides the named zone.
    fn from_config(config: &PageConfig) -> Result<Self, RenderError> {
        match config.utc_offset_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(DisplayZone::Fixed)
                .ok_or(RenderError::InvalidUtcOffset(minutes)),
            None => config
                .time_zone
                .parse::<Tz>()
                .map(DisplayZone::Named)
                .map_err(|_| RenderError::UnknownTimeZone(config.time_zone.clone())),
        }
    }

    fn format(&self, published_at: &str) -> String {
        match self {
            DisplayZone::Named(zone) => format_published_at(published_at, zone),
            DisplayZone::Fixed(offset) => format_published_at(published_at, offset),
        }
    }
}

pub(crate) struct PageRenderer {
    config: PageConfig,
}

impl PageRenderer {
    pub(crate) fn new(config: PageConfig) -> Self {
        Self { config }
    }

    pub(crate) fn render(&self, results: &[SearchResult]) -> Result<String, RenderError> {
        let zone = DisplayZone::from_config(&self.config)?;

        let mut html = String::with_capacity(INLINE_STYLES.len() + results.len() * 512 + 4096);

        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, r#"<html lang="en">"#)?;
        self.write_head(&mut html)?;
        writeln!(html, "<body>")?;
        self.write_header(&mut html, results, &zone)?;
        self.write_grid(&mut html, results)?;
        write_modal(&mut html)?;
        writeln!(
            html,
            "<footer><p>{}</p></footer>",
            escape_html(&self.config.footer)
        )?;
        self.write_scripts(&mut html, results)?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;

        Ok(html)
    }

    fn write_head(&self, html: &mut String) -> Result<(), RenderError> {
        writeln!(html, "<head>")?;
        writeln!(html, r#"<meta charset="UTF-8">"#)?;
        writeln!(
            html,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#
        )?;
        writeln!(html, "<title>{}</title>", escape_html(&self.config.title))?;
        writeln!(
            html,
            r#"<link rel="stylesheet" href="{}">"#,
            escape_html(&self.config.stylesheet_href)
        )?;
        writeln!(html, "<style>\n{}</style>", INLINE_STYLES)?;

        if let Some(tag) = &self.config.analytics_tag {
            writeln!(
                html,
                r#"<script async src="{}?id={}"></script>"#,
                GTAG_URL,
                escape_html(tag)
            )?;
            writeln!(
                html,
                "<script>window.dataLayer = window.dataLayer || []; \
                 function gtag(){{dataLayer.push(arguments);}} \
                 gtag('js', new Date()); gtag('config', {});</script>",
                script_literal(tag)?
            )?;
        }

        writeln!(html, "</head>")?;

        Ok(())
    }

    fn write_header(
        &self,
        html: &mut String,
        results: &[SearchResult],
        zone: &DisplayZone,
    ) -> Result<(), RenderError> {
        let last_updated = match results.first() {
            Some(result) => zone.format(&result.published_at),
            None => "No videos found".to_string(),
        };
        let last_updated = format!("Last video updated: {}", last_updated);

        writeln!(html, "<header>")?;
        writeln!(html, "<h1>{}</h1>", escape_html(&self.config.title))?;
        writeln!(
            html,
            r#"<p class="tagline">{}</p>"#,
            escape_html(&self.config.tagline)
        )?;
        writeln!(
            html,
            r#"<p class="last-updated">{}</p>"#,
            escape_html(&last_updated)
        )?;
        writeln!(html, "</header>")?;

        if self.config.play_all_button && !results.is_empty() {
            writeln!(
                html,
                r#"<div class="play-all-container"><button id="play-all-button" class="play-all-button" type="button">Play All</button></div>"#
            )?;
        }

        Ok(())
    }

    fn write_grid(&self, html: &mut String, results: &[SearchResult]) -> Result<(), RenderError> {
        writeln!(html, r#"<main id="videos-container" class="videos-container">"#)?;

        for (index, result) in results.iter().enumerate() {
            let title = escape_html(&result.title);

            writeln!(
                html,
                r#"<div class="video-item" data-index="{}" data-video-id="{}">"#,
                index,
                escape_html(&result.id)
            )?;
            writeln!(
                html,
                r#"<div class="thumbnail"><img src="{}" alt="{}" loading="lazy"><span class="played-indicator">Watched</span></div>"#,
                escape_html(&result.thumbnail_url),
                title
            )?;
            writeln!(html, r#"<h3 class="item-title">{}</h3>"#, title)?;
            writeln!(html, "</div>")?;
        }

        writeln!(html, "</main>")?;

        Ok(())
    }

    fn write_scripts(&self, html: &mut String, results: &[SearchResult]) -> Result<(), RenderError> {
        writeln!(
            html,
            r#"<script type="application/json" id="video-data">{}</script>"#,
            embed_json(results)?
        )?;
        writeln!(html, r#"<script type="module">"#)?;
        writeln!(
            html,
            "import init, {{ mount }} from {};",
            script_literal(&self.config.script_href)?
        )?;
        writeln!(
            html,
            "init().then(() => mount({}));",
            self.config.autoplay
        )?;
        writeln!(html, "</script>")?;

        Ok(())
    }
}

fn write_modal(html: &mut String) -> Result<(), RenderError> {
    writeln!(html, r#"<div id="video-modal" class="modal">"#)?;
    writeln!(html, r#"<div class="modal-content">"#)?;
    writeln!(
        html,
        r#"<span id="close-button" class="close-button">&times;</span>"#
    )?;
    writeln!(html, r#"<div id="video-counter" class="video-counter"></div>"#)?;
    writeln!(html, r#"<div id="video-player" class="video-player"></div>"#)?;
    writeln!(html, r#"<div id="player-controls" class="player-controls">"#)?;
    writeln!(
        html,
        r#"<button id="prev-video-button" type="button">Previous</button>"#
    )?;
    writeln!(
        html,
        r#"<button id="next-video-button" type="button">Next</button>"#
    )?;
    writeln!(html, "</div>")?;
    writeln!(
        html,
        r#"<div class="video-info"><h2 id="video-title"></h2><p id="video-description"></p></div>"#
    )?;
    writeln!(html, "</div>")?;
    writeln!(html, "</div>")?;

    Ok(())
}

/// Falls back to the raw value when it is not an RFC 3339 timestamp.
pub(crate) fn format_published_at<Z>(published_at: &str, zone: &Z) -> String
where
    Z: TimeZone,
    Z::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(date) => date
            .with_timezone(zone)
            .format("%-d %B %Y at %I:%M:%S %P")
            .to_string(),
        Err(_) => published_at.to_string(),
    }
}

/// JSON that is safe to place inside a `<script>` element.
pub(crate) fn embed_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    let json = serde_json::to_string(value)?;

    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn script_literal(value: &str) -> Result<String, RenderError> {
    embed_json(value)
}
