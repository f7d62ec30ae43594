use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::GalleryConfig;
use crate::data::sweep::SweepRecord;
use crate::error::{IvError, Result};
use crate::render::export::{escape_html, write_html};
use crate::state::figure::FigureState;

/// A named set of sweeps rendered as one gallery entry.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub sweeps: Vec<SweepRecord>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, sweeps: Vec<SweepRecord>) -> Self {
        Self {
            name: name.into(),
            sweeps,
        }
    }
}

/// One written entry: dataset name, document file name and anchor id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub name: String,
    pub file: String,
    pub anchor: String,
}

/// File-system and URL safe stem for a dataset name.
pub fn slug(name: &str) -> String {
    let s: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        "dataset".to_string()
    } else {
        s
    }
}

/// Render every dataset into `output_dir` and write the index page.
/// Returns the index path.
pub fn build_gallery(
    datasets: &[Dataset],
    output_dir: &Path,
    config: &GalleryConfig,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| IvError::io(output_dir, e))?;

    let mut taken: HashSet<String> = HashSet::new();
    taken.insert(config.index_file.to_lowercase());
    let mut entries = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        tracing::info!("Generating IV plot for {}", dataset.name);
        let mut options = config.plot.clone();
        options.title = dataset.name.clone();
        let mut figure = FigureState::new(&options);
        figure.overlay(&dataset.sweeps, &options)?;

        let stem = slug(&dataset.name);
        let mut anchor = stem.clone();
        let mut n = 2;
        while !taken.insert(format!("{anchor}.html").to_lowercase()) {
            anchor = format!("{stem}-{n}");
            n += 1;
        }
        let file = format!("{anchor}.html");
        write_html(&figure, &output_dir.join(&file), config.theme)?;
        entries.push(GalleryEntry {
            name: dataset.name.clone(),
            file,
            anchor,
        });
    }

    let index = output_dir.join(&config.index_file);
    std::fs::write(&index, render_index(&entries, config))
        .map_err(|e| IvError::io(&index, e))?;
    tracing::info!("Gallery created: {:?}", index);
    Ok(index)
}

/// Index page: navigation list, then one section per entry with a lazily
/// loaded frame and a back-to-top link.
pub fn render_index(entries: &[GalleryEntry], config: &GalleryConfig) -> String {
    let theme = config.theme;
    let title = escape_html(&config.title);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{
    font-family: Arial, sans-serif;
    margin: 20px;
    background: {bg};
    color: {fg};
}}
a {{ color: {link}; }}
h1 {{ text-align: center; }}
.plot-container {{
    margin-top: 60px;
    border-top: 2px solid {border};
    padding-top: 20px;
}}
.back-to-top {{ margin-top: 10px; }}
iframe {{
    width: 100%;
    height: {height}px;
    border: none;
}}
.nav-list {{ line-height: 1.7; }}
footer {{ margin-top: 40px; font-size: small; opacity: 0.7; }}
</style>
</head>
<body>
<h1 id="top">{title}</h1>
<h2>Jump to transistor:</h2>
<ul class="nav-list">
"#,
        bg = theme.page_bg(),
        fg = theme.text_color(),
        link = theme.link_color(),
        border = theme.border_color(),
        height = config.iframe_height,
    );

    for entry in entries {
        let _ = writeln!(
            html,
            r##"<li><a href="#{}">{}</a></li>"##,
            escape_html(&entry.anchor),
            escape_html(&entry.name)
        );
    }
    html.push_str("</ul>\n<hr>\n");

    for entry in entries {
        let name = escape_html(&entry.name);
        let _ = writeln!(
            html,
            r##"<div class="plot-container" id="{anchor}">
<h2>{name}</h2>
<iframe src="{file}" loading="lazy" title="{name}"></iframe>
<div class="back-to-top"><a href="#top">Back to top</a></div>
</div>"##,
            anchor = escape_html(&entry.anchor),
            file = escape_html(&entry.file),
        );
    }

    let _ = write!(
        html,
        "<footer>{} plots, generated {}</footer>\n</body>\n</html>\n",
        entries.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    html
}
