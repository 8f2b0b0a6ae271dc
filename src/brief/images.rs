use fs_err as fs;
use reqwest::Client;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::provider::image_mime;

pub fn is_supported_image(path: &Path) -> bool {
    image_mime(path).is_some()
}

/// Explicit images first, then images found under `dir` in name order.
/// Unsupported or missing files are skipped.
pub fn collect_images(explicit: &[PathBuf], dir: Option<&Path>) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = explicit
        .iter()
        .filter(|p| p.is_file() && is_supported_image(p))
        .cloned()
        .collect();

    if let Some(dir) = dir {
        let found = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
            .map(|e| e.into_path());
        out.extend(found);
    }
    out
}

/// Best-effort download of swipe-file reference images; failures are logged
/// and skipped.
pub async fn download_images(client: &Client, urls: &[String], dest: &Path) -> Vec<PathBuf> {
    let mut saved = Vec::new();
    if urls.is_empty() {
        return saved;
    }
    if let Err(e) = fs::create_dir_all(dest) {
        tracing::warn!(error = %e, "cannot create image cache dir");
        return saved;
    }

    for (i, url) in urls.iter().enumerate() {
        match fetch(client, url).await {
            Ok(bytes) => {
                let path = dest.join(file_name_for(url, i));
                match fs::write(&path, &bytes) {
                    Ok(()) => {
                        tracing::debug!(%url, path = %path.display(), "downloaded reference image");
                        saved.push(path);
                    }
                    Err(e) => tracing::warn!(%url, error = %e, "cannot save reference image"),
                }
            }
            Err(e) => tracing::warn!(%url, error = %e, "reference image download failed"),
        }
    }
    saved
}

async fn fetch(client: &Client, url: &str) -> reqwest::Result<Vec<u8>> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

fn file_name_for(url: &str, index: usize) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if !last.is_empty() && is_supported_image(Path::new(last)) {
        format!("{:02}_{}", index + 1, last)
    } else {
        format!("image_{:02}.jpg", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_explicit_then_directory_images() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("refs");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("b.png"), b"x").unwrap();
        fs::write(sub.join("a.jpg"), b"x").unwrap();
        fs::write(sub.join("notes.txt"), b"x").unwrap();
        let explicit = dir.path().join("hero.webp");
        fs::write(&explicit, b"x").unwrap();

        let images = collect_images(
            &[explicit.clone(), dir.path().join("missing.png")],
            Some(&sub),
        );
        assert_eq!(images, vec![explicit, sub.join("a.jpg"), sub.join("b.png")]);
    }

    #[test]
    fn names_downloads_from_url() {
        assert_eq!(file_name_for("https://x.com/img/shot.PNG?size=2", 0), "01_shot.PNG");
        assert_eq!(
            file_name_for("https://drive.google.com/uc?export=download&id=abc", 4),
            "image_05.jpg"
        );
    }

    #[tokio::test]
    async fn downloads_and_skips_failures() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server.mock("GET", "/ok.png").with_status(200).with_body("png").create_async().await;
        let _gone = server.mock("GET", "/gone.png").with_status(404).create_async().await;

        let dir = tempfile::tempdir().unwrap();
        let urls = vec![format!("{}/ok.png", server.url()), format!("{}/gone.png", server.url())];
        let saved = download_images(&Client::new(), &urls, dir.path()).await;
        assert_eq!(saved, vec![dir.path().join("01_ok.png")]);
        assert_eq!(fs::read(&saved[0]).unwrap(), b"png");
    }
}
