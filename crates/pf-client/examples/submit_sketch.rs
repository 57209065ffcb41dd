//! Draw a quick sketch, save it next to the binary's working directory, and
//! submit it to a running `pf-server`.
//!
//! Usage: `submit_sketch [base-url] [name] [race] [class]`

use pf_client::{CharacterSession, SAVED_MESSAGE, SaveOutcome, SubmitConfig, Submitter};
use pf_core::{CharacterClass, Race};
use pf_editor::SurfaceConfig;
use pf_editor::input::Point;
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let base_url = args.get(1).map(String::as_str).unwrap_or("http://127.0.0.1:3000");

    let mut session = match CharacterSession::new(SurfaceConfig::default()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("submit_sketch: {e}");
            std::process::exit(1);
        }
    };
    session.draft.name = args.get(2).cloned().unwrap_or_else(|| "Eldrin".into());
    session.draft.race = Race::parse(args.get(3).map(String::as_str).unwrap_or("elf"));
    session.draft.class = CharacterClass::parse(args.get(4).map(String::as_str).unwrap_or("wizard"));

    // A stick figure.
    let strokes: [&[(f32, f32)]; 4] = [
        &[(250.0, 120.0), (290.0, 160.0), (250.0, 200.0), (210.0, 160.0), (250.0, 120.0)],
        &[(250.0, 200.0), (250.0, 380.0)],
        &[(170.0, 260.0), (250.0, 240.0), (330.0, 260.0)],
        &[(190.0, 520.0), (250.0, 380.0), (310.0, 520.0)],
    ];
    session.surface.set_brush_width(6.0);
    for stroke in strokes {
        let mut points = stroke.iter().map(|&p| Point::from(p));
        if let Some(first) = points.next() {
            session.surface.stroke_start(first);
            for point in points {
                session.surface.stroke_extend(point);
            }
            session.surface.stroke_end();
        }
    }

    match session.surface.export_to(Path::new(".")) {
        Ok(path) => println!("saved {}", path.display()),
        Err(e) => eprintln!("export failed: {e}"),
    }

    let submitter = match Submitter::new(SubmitConfig::for_base_url(base_url)) {
        Ok(submitter) => submitter,
        Err(e) => {
            eprintln!("submit_sketch: {e}");
            std::process::exit(1);
        }
    };
    match session.save(&submitter).await {
        SaveOutcome::Saved => {
            println!("{SAVED_MESSAGE}");
            println!("{}", session.description().unwrap_or_default());
        }
        SaveOutcome::Failed(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        SaveOutcome::NotOffered => eprintln!("a save is already in progress"),
    }
}
