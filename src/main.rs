use anyhow::Result;
use log::info;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use supervision::camera::SyntheticCamera;
use supervision::dashboard::run_dashboard;
use supervision::portal::run_portal;
use supervision::settings::ClientSettings;
use supervision::view::View;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("SuperVision client starting up...");

    let settings_path = std::env::var("SUPERVISION_SETTINGS")
        .unwrap_or_else(|_| "supervision.json".to_string());
    let settings = ClientSettings::load(Path::new(&settings_path))?;

    let view = View::from_args(std::env::args().skip(1), &settings.student_id);

    // ctrl-c is the unmount signal; every task hangs off this token
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                cancel.cancel();
            }
        });
    }

    match view {
        View::Landing => {
            println!("SuperVision — real-time classroom engagement monitoring");
            println!();
            println!("Select a role:");
            println!("  supervision student [id]   student portal (default id: {})", settings.student_id);
            println!("  supervision teacher        teacher dashboard");
            Ok(())
        }
        View::Student { student_id } => {
            run_portal(&settings, &student_id, &SyntheticCamera::default(), cancel)
                .await
                .map(|_stats| ())
        }
        View::Teacher => run_dashboard(&settings, cancel).await,
    }
}
