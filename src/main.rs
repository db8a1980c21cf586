use std::{
    path::PathBuf,
    sync::{Arc, mpsc},
    thread,
};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::error;

use facemark::FacemarkError;
use facemark::capture::{
    CaptureEvent,
    producer::{DirectoryFrameProducer, FrameProducer},
    run_capture,
    runner::CaptureConfig,
    uploader::RecognitionClient,
};
use facemark::config::AppConfig;
use facemark::ui::chart::AttendanceChartApp;
use facemark::ui::live::LiveCaptureApp;
use facemark::writer;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the capture loop against a recognition endpoint
    Live {
        /// Directory of frame images standing in for the camera feed
        #[arg(short, long)]
        source: PathBuf,

        /// Recognition endpoint URL; overrides the config file
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Append capture events to this JSON Lines session log
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not acquire the feed automatically; wait for the start button
        #[arg(short, long, default_value_t = false)]
        manual: bool,
    },
    /// Chart an attendance series from a JSON data file
    Chart {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn live(
    source: PathBuf,
    endpoint: Option<String>,
    output: Option<PathBuf>,
    manual: bool,
) -> Result<(), FacemarkError> {
    let app_config = AppConfig::from_local_file().unwrap_or_default();
    let mark_endpoint = endpoint.unwrap_or_else(|| app_config.mark_endpoint.clone());
    let capture_config = CaptureConfig {
        refresh_rate_ms: app_config.refresh_rate_ms,
        sample_probability: app_config.sample_probability,
        jpeg_quality: app_config.jpeg_quality,
        stop_on_success: app_config.stop_on_success,
    };

    let (event_tx, event_rx) = mpsc::channel::<CaptureEvent>();

    // if we need to write a session log we create a second channel and have
    // the capture loop broadcast to both the UI and writer channels
    let writer_tx = output.map(|output_file| {
        let (writer_tx, writer_rx) = mpsc::channel::<CaptureEvent>();
        thread::spawn(move || writer::write_events(&output_file, writer_rx));
        writer_tx
    });

    let producer = DirectoryFrameProducer::new(source, true);
    let recognizer = Arc::new(RecognitionClient::new(mark_endpoint));

    // capability probe: when the feed cannot be acquired automatically the
    // status window reveals a manual start control instead
    let auto_start = !manual && producer.is_available();
    let (start_tx, start_rx) = mpsc::channel::<()>();
    {
        let event_tx = event_tx.clone();
        thread::spawn(move || {
            if !auto_start && start_rx.recv().is_err() {
                // window closed without ever starting the feed
                return;
            }
            if let Err(e) = run_capture(producer, recognizer, event_tx, writer_tx, capture_config)
            {
                error!("Capture loop ended: {}", e);
            }
        });
    }

    let status_window_position = app_config.status_window_position.clone();

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(420., 180.))
        .with_position(status_window_position);

    eframe::run_native(
        "Facemark",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(LiveCaptureApp::new(
                event_rx,
                (!auto_start).then_some(start_tx),
                app_config,
                cc,
            )))
        }),
    )
    .expect("could not start app");
    Ok(())
}

fn chart(input: &PathBuf) -> Result<(), FacemarkError> {
    if !input.exists() {
        return Err(FacemarkError::InvalidAttendanceFile {
            path: format!("{:?}", input),
        });
    }
    eframe::run_native(
        "Facemark Attendance",
        eframe::NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(AttendanceChartApp::from_file(input, cc)))),
    )
    .expect("could not start app");
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");
    match cli.command {
        Commands::Live {
            source,
            endpoint,
            output,
            manual,
        } => {
            live(source, endpoint, output, manual).expect("Error while running capture loop");
        }
        Commands::Chart { input } => {
            chart(&input).expect("Error while charting attendance data");
        }
    };
}
