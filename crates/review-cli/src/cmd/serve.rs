use anyhow::Result;
use review_server::AppState;
use std::path::Path;

pub fn run(root: &Path, api_url: Option<&str>, port: u16, no_open: bool) -> Result<()> {
    let config = super::load_config(root, api_url)?;
    let rt = super::runtime()?;

    rt.block_on(async move {
        let state = AppState::from_config(root.to_path_buf(), &config)?;
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();

        println!(
            "Review dashboard for {} → http://localhost:{actual_port}",
            config.api.base_url
        );

        tokio::select! {
            res = review_server::serve_on(state, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
