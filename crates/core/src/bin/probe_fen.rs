//! Probe one position and print the ranked moves

use syzygy_tables_core::probe::TablebaseClient;
use syzygy_tables_core::ranking::Bucket;
use syzygy_tables_core::render::render_position;
use syzygy_tables_core::stats::StatsTable;
use syzygy_tables_core::DEFAULT_BACKEND;

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let fen = args.next().unwrap_or_else(|| {
        eprintln!("Usage: probe_fen <fen> [backend]");
        std::process::exit(1);
    });
    let backend = args.next().unwrap_or_else(|| DEFAULT_BACKEND.to_string());

    let client = match TablebaseClient::new(&backend) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    let model = match render_position(&client, &StatsTable::empty(), Some(&fen), None, true).await {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Probe failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("{} [{}]", model.board.fen, model.material);
    println!("{}", model.root.status);
    if let Some(best) = &model.bestmove {
        println!("Best move: {} ({})", best.san, best.badge);
    }

    for bucket in Bucket::ALL {
        let moves = model.moves.bucket(bucket);
        if moves.is_empty() {
            continue;
        }
        println!("\n{:?}:", bucket);
        for mv in moves {
            println!("  {:<8} {}", mv.san, mv.badge);
        }
    }
}
