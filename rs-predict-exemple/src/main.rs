use std::io::{BufRead, Write, stdin, stdout};

use rs_predict_core::model::session::{Session, SessionConfig};
use rs_predict_core::model::store::ModelStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Store the learned model next to the demo data
    // An existing model file is loaded automatically
    let store = ModelStore::new("./data/model.dat");

    // Texts used to pre-train a brand new model; ignored once a
    // persisted model exists
    let initial_corpus = vec![
        "the quick brown fox jumps over the lazy dog".to_owned(),
        "the lazy dog sleeps all day".to_owned(),
        "a quick brown cat chases the quick brown fox".to_owned(),
    ];

    // Default configuration: order 3, alpha 0.1, retrain every 100 texts
    // Each knob can be overridden before building the session
    let mut session = Session::new(SessionConfig::default(), store, &initial_corpus)?;

    let stats = session.stats();
    println!(
        "Model ready: {} distinct words, {} words seen, order {}",
        stats.vocabulary, stats.total_words, stats.order
    );
    println!("Type some text to get next-word suggestions ('exit' to quit)");

    let mut line = String::new();
    loop {
        print!("> ");
        stdout().flush()?;

        line.clear();
        if stdin().lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();

        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") {
            break;
        }

        // Suggest the three most probable continuations
        for prediction in session.predict(text, 3) {
            println!("  {} ({:.4})", prediction.word, prediction.probability);
        }

        // Feed the input back into the history buffer; the session
        // retrains on its own once the buffer fills up
        session.accumulate(text);
    }

    // Learn whatever is still pending before leaving
    if let Err(e) = session.force_retrain() {
        println!("Model trained but not saved: {e}");
    }

    let stats = session.stats();
    println!(
        "Bye: {} distinct words, {} words seen",
        stats.vocabulary, stats.total_words
    );

    Ok(())
}
