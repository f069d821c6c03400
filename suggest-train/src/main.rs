use std::path::PathBuf;
use std::time::Instant;

use suggest_core::io::{build_output_path, read_corpus};
use suggest_core::model::ngram_model::NGramModel;
use suggest_core::model::suggestion::{SuggestionEngine, SuggestionInput};
use suggest_core::model::tokenizer::{WhiteSpaceTokenizer, extract_message_body};
use suggest_core::model::word_completor::WordCompletor;

// Training parameters: context length of the n-gram model and the
// minimum occurrence count for a token to enter the vocabulary
const ORDER: usize = 3;
const MIN_COUNT: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Corpus file: one email message per line
    let corpus_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./data/emails.txt".to_owned());

    // Output blob path: derived from the corpus path unless given
    let model_path = match std::env::args().nth(2) {
        Some(path) => PathBuf::from(path),
        None => build_output_path(&corpus_path, "bin")?,
    };

    let started = Instant::now();
    let raw = read_corpus(&corpus_path)?;
    log::info!("Read {} messages in {:.2?}", raw.len(), started.elapsed());

    // Strip headers, quoted replies and boilerplate before fitting
    let phase = Instant::now();
    let cleaned: Vec<String> = raw.iter().map(|message| extract_message_body(message)).collect();
    log::info!("Cleaned corpus in {:.2?}", phase.elapsed());

    let phase = Instant::now();
    let tokenizer = WhiteSpaceTokenizer::fit(&cleaned, MIN_COUNT, ORDER)?;
    log::info!(
        "Fitted tokenizer ({} tokens) in {:.2?}",
        tokenizer.vocabulary().len(),
        phase.elapsed()
    );

    let phase = Instant::now();
    let tokenized: Vec<Vec<String>> = cleaned.iter().map(|message| tokenizer.encode(message)).collect();
    log::info!("Encoded corpus in {:.2?}", phase.elapsed());

    let phase = Instant::now();
    let word_completor = WordCompletor::build(&tokenized, MIN_COUNT)?;
    log::info!("Built word completor in {:.2?}", phase.elapsed());

    let phase = Instant::now();
    let ngram_model = NGramModel::build(&tokenized, ORDER, 3, 3)?;
    log::info!(
        "Built n-gram model ({} contexts) in {:.2?}",
        ngram_model.context_count(),
        phase.elapsed()
    );

    // Compose the three frozen models and persist the whole engine
    let engine = SuggestionEngine::new(word_completor, ngram_model, tokenizer);
    engine.save(&model_path)?;
    log::info!(
        "Saved model to {} ({:.2?} total)",
        model_path.display(),
        started.elapsed()
    );

    // Quick smoke check on the freshly trained engine
    for text in ["i want to", "please let me know"] {
        let suggestion = engine.suggest(SuggestionInput::Text(text), 3, 1);
        println!("{text:?} -> {:?}", suggestion[0]);
    }

    Ok(())
}
