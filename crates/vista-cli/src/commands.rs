//! CLI command implementations

use crate::output::{self, OutputFormat};
use anyhow::Context;
use tabled::{Table, Tabled};
use url::Url;
use vista_core::{
    crop_resize, HorizontalAnchor, HttpSource, LayoutTarget, SceneList, SceneSource, Size,
    VerticalAnchor,
};

/// Load a scene list from an http(s) URL or a local file
pub async fn load_scene_list(source: &str) -> anyhow::Result<SceneList> {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(HttpSource::new(url).load().await?),
        _ => {
            let json = tokio::fs::read_to_string(source)
                .await
                .with_context(|| format!("reading scene source {}", source))?;
            Ok(SceneList::from_json(&json)?)
        }
    }
}

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "ID")]
    id: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Codecs")]
    codecs: String,
    #[tabled(rename = "Desktop poster")]
    poster: String,
}

/// List the scenes of a scene source
pub async fn inspect(source: &str, format: &str) -> anyhow::Result<()> {
    let list = load_scene_list(source).await?;

    if OutputFormat::from(format) == OutputFormat::Json {
        println!("{}", list.to_json());
        return Ok(());
    }

    let rows: Vec<SceneRow> = list
        .iter()
        .map(|scene| {
            let codecs = scene.available_codecs();
            SceneRow {
                id: scene.id,
                title: scene.title.clone(),
                project: scene.project.clone(),
                category: scene.category.clone(),
                codecs: if codecs.is_empty() {
                    "poster only".to_string()
                } else {
                    codecs.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
                },
                poster: scene.poster_desktop.clone(),
            }
        })
        .collect();

    println!("Scene source: {}", source);
    println!("{}", Table::new(rows));
    Ok(())
}

/// Compute a cover-fit placement
pub fn layout(
    content: &str,
    target: &str,
    vertical: &str,
    horizontal: &str,
    format: &str,
) -> anyhow::Result<()> {
    let content: Size = content.parse().map_err(anyhow::Error::msg)?;
    let target_size: Size = target.parse().map_err(anyhow::Error::msg)?;
    let target = LayoutTarget {
        width: target_size.width,
        height: target_size.height,
        vertical: vertical.parse::<VerticalAnchor>().map_err(anyhow::Error::msg)?,
        horizontal: horizontal.parse::<HorizontalAnchor>().map_err(anyhow::Error::msg)?,
    };

    let Some(placement) = crop_resize(content, &target) else {
        anyhow::bail!("content {} cannot be scaled into {}", content, target_size);
    };

    if OutputFormat::from(format) == OutputFormat::Json {
        println!("{}", output::to_json(&placement));
        return Ok(());
    }

    println!("Cover-fit {} into {}:", content, target_size);
    println!("  Size:   {}x{}", placement.width, placement.height);
    println!("  Top:    {}", output::offset(placement.top));
    println!("  Right:  {}", output::offset(placement.right));
    println!("  Bottom: {}", output::offset(placement.bottom));
    println!("  Left:   {}", output::offset(placement.left));
    Ok(())
}
