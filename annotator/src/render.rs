use std::io::{self, Write};
use tracing::error;

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }

    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().floor() as u64;
    format!("{}{}:{:02}", sign, total / 60, total % 60)
}

/// One breakpoint row; every row exposes Set/Jump/Rename/Delete actions.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointRow {
    pub id: String,
    pub name: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateControl {
    pub rate: f64,
    pub active: bool,
}

/// A previously visited video.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub video_id: String,
    pub title: String,
    pub active: bool,
}

/// Everything the rendering surface shows.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub start: String,
    pub end: String,
    pub loop_enabled: bool,
    pub rows: Vec<BreakpointRow>,
    pub rates: Vec<RateControl>,
    pub gallery: Vec<GalleryItem>,
}

impl View {
    pub fn loop_label(&self) -> &'static str {
        if self.loop_enabled {
            "LOOP ACTIVE"
        } else {
            "ENABLE LOOP"
        }
    }
}

pub trait Renderer: Send {
    fn render(&mut self, view: &View);
}

/// Renders views as plain text.
pub struct TextRenderer<W: Write + Send> {
    out: W,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_view(&mut self, view: &View) -> io::Result<()> {
        let out = &mut self.out;
        match (&view.video_id, &view.title) {
            (Some(id), Some(title)) if !title.is_empty() => writeln!(out, "▶ {} [{}]", title, id)?,
            (Some(id), _) => writeln!(out, "▶ [{}]", id)?,
            (None, _) => writeln!(out, "▶ no video")?,
        }

        writeln!(out, "A {}  B {}  [{}]", view.start, view.end, view.loop_label())?;

        let rates: Vec<String> = view
            .rates
            .iter()
            .map(|c| {
                if c.active {
                    format!("[{}x]", c.rate)
                } else {
                    format!("{}x", c.rate)
                }
            })
            .collect();
        writeln!(out, "speed: {}", rates.join(" "))?;

        writeln!(out, "breakpoints:")?;
        if view.rows.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for row in &view.rows {
            writeln!(out, "  {:<8} {:>7}  {}", row.id, row.time, row.name)?;
        }

        writeln!(out, "videos:")?;
        for item in &view.gallery {
            let marker = if item.active { '*' } else { ' ' };
            writeln!(out, "{} {}  {}", marker, item.video_id, item.title)?;
        }

        out.flush()
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &View) {
        if let Err(e) = self.write_view(view) {
            error!("Render view: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(12.5), "0:12");
        assert_eq!(format_time(75.9), "1:15");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-5.0), "-0:05");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn text_renderer_lists_rows_and_gallery() {
        let view = View {
            video_id: Some("dQw4w9WgXcQ".to_string()),
            title: Some("Song".to_string()),
            start: "0:10".to_string(),
            end: "0:20".to_string(),
            loop_enabled: true,
            rows: vec![BreakpointRow {
                id: "bp_1".to_string(),
                name: "Intro".to_string(),
                time: "0:12".to_string(),
            }],
            rates: vec![
                RateControl {
                    rate: 1.0,
                    active: true,
                },
                RateControl {
                    rate: 2.0,
                    active: false,
                },
            ],
            gallery: vec![GalleryItem {
                video_id: "dQw4w9WgXcQ".to_string(),
                title: "Song".to_string(),
                active: true,
            }],
        };

        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&view);
        let text = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(text.contains("▶ Song [dQw4w9WgXcQ]"));
        assert!(text.contains("A 0:10  B 0:20  [LOOP ACTIVE]"));
        assert!(text.contains("speed: [1x] 2x"));
        assert!(text.contains("bp_1"));
        assert!(text.contains("Intro"));
        assert!(text.contains("* dQw4w9WgXcQ  Song"));
    }
}
