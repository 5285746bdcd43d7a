/**
 * This module contains all logic for loading images from external files.
 *
 * Native builds read from the asset root (`./assets` or `$SCENE_NGIN_ASSETS`),
 * web builds fetch relative to `<origin>/assets/`.
 */
pub mod loader;

/// Environment variable overriding the native asset root.
pub const ASSET_ROOT_ENV: &str = "SCENE_NGIN_ASSETS";

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    use anyhow::Context;
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("no origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{origin}/assets/"))?;
    Ok(base.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn asset_path(file_name: &str) -> std::path::PathBuf {
    let root = std::env::var_os(ASSET_ROOT_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::Path::new("./").join("assets"));
    root.join(file_name)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(asset_path(file_name)).await?;

    Ok(data)
}

/// Read `file_name` relative to an explicit root instead of the default
/// asset root.
#[cfg(not(target_arch = "wasm32"))]
pub async fn load_binary_in(root: &std::path::Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    Ok(tokio::fs::read(root.join(file_name)).await?)
}
