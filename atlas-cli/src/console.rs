use std::str::FromStr;

use atlas_rag::groq::{GroqModel, OpenAICompatibleCompleter};
use atlas_rag::{Answer, AnswerGuard, RetrievalPipeline, RetrievalWarning};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, info};

/// Shown instead of an answer when the completion model cannot be reached.
pub const CONNECTION_ERROR: &str = "Bağlantı hatası, lütfen tekrar deneyin.";

const HELP: &str = "\
Komutlar:
  :rerank on|off   yeniden sıralamayı aç/kapat
  :model <id>      dil modelini değiştir
  :stats           indeks istatistikleri
  :reset           indeksi temizle
  :help            bu yardım
  :quit            çıkış";

/// A console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rerank(bool),
    Model(GroqModel),
    Stats,
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parse a `:`-prefixed line. Returns `None` for ordinary questions.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let rest = line.trim().strip_prefix(':')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        let command = match (name, arg) {
            ("rerank", Some("on")) => Ok(Command::Rerank(true)),
            ("rerank", Some("off")) => Ok(Command::Rerank(false)),
            ("rerank", _) => Err("kullanım: :rerank on|off".to_string()),
            ("model", Some(id)) => GroqModel::from_str(id).map(Command::Model).map_err(|e| e.to_string()),
            ("model", None) => Err(format!(
                "kullanım: :model <id> ({})",
                GroqModel::ALL.map(GroqModel::id).join(", ")
            )),
            ("stats", _) => Ok(Command::Stats),
            ("reset", _) => Ok(Command::Reset),
            ("help", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", _) => Ok(Command::Quit),
            (other, _) => Err(format!("bilinmeyen komut ':{other}', :help yazın")),
        };
        Some(command)
    }
}

/// One user's question-answering session over an indexed document set.
pub struct Session {
    pipeline: RetrievalPipeline,
    guard: AnswerGuard,
    api_key: String,
    model: GroqModel,
    completer: OpenAICompatibleCompleter,
    rerank: bool,
}

impl Session {
    pub fn new(
        pipeline: RetrievalPipeline,
        api_key: String,
        model: GroqModel,
    ) -> anyhow::Result<Self> {
        let completer = OpenAICompatibleCompleter::groq(api_key.clone(), model)?;
        let rerank = pipeline.config().use_reranking;
        Ok(Self { pipeline, guard: AnswerGuard::new(), api_key, model, completer, rerank })
    }

    /// Answer one question and print it with its sources.
    pub async fn ask(&self, question: &str) -> anyhow::Result<()> {
        let retrieval = self.pipeline.retrieve(question, self.pipeline.config().top_k, self.rerank).await?;
        for warning in &retrieval.warnings {
            match warning {
                RetrievalWarning::RerankDegraded(_) => {
                    println!("(yeniden sıralama kullanılamadı, vektör sırası kullanılıyor)")
                }
                RetrievalWarning::IndexUnavailable => println!("(henüz doküman işlenmedi)"),
                RetrievalWarning::QueryEmbeddingFailed(_) | RetrievalWarning::SearchFailed(_) => {
                    println!("(arama yapılamadı)")
                }
            }
        }

        match self.guard.answer(&self.completer, question, &retrieval).await {
            Ok(answer) => print_answer(&answer, retrieval.reranked),
            Err(e) => {
                error!(model = %self.model, error = %e, "answer failed");
                println!("{CONNECTION_ERROR}");
            }
        }
        Ok(())
    }

    /// Apply a console command. Returns `false` when the session should end.
    pub async fn apply(&mut self, command: Command) -> anyhow::Result<bool> {
        match command {
            Command::Rerank(enabled) => {
                if enabled && !self.pipeline.has_reranker() {
                    println!("Yeniden sıralama sunucusu yapılandırılmamış (ATLAS_RERANKER_URL).");
                }
                self.rerank = enabled;
                println!("Yeniden sıralama: {}", if enabled { "açık" } else { "kapalı" });
            }
            Command::Model(model) => {
                self.completer = OpenAICompatibleCompleter::groq(self.api_key.clone(), model)?;
                self.model = model;
                info!(model = %model, "completion model changed");
                println!("Model: {}", model.display_name());
            }
            Command::Stats => match self.pipeline.stats().await {
                Some(stats) => println!(
                    "{} doküman, {} parça, {} boyut",
                    stats.documents, stats.entries, stats.dimensions
                ),
                None => println!("İndeks boş."),
            },
            Command::Reset => {
                self.pipeline.clear().await?;
                println!("İndeks temizlendi.");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Run the interactive console until `:quit`, Ctrl-C or Ctrl-D.
    pub async fn run_console(mut self) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new()?;
        println!(
            "Atlas hazır. Model: {}, yeniden sıralama: {}. :help ile komutları görün.\n",
            self.model.display_name(),
            if self.rerank { "açık" } else { "kapalı" }
        );

        loop {
            let line = match editor.readline("Soru > ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            editor.add_history_entry(line)?;

            match Command::parse(line) {
                Some(Ok(command)) => {
                    if !self.apply(command).await? {
                        break;
                    }
                }
                Some(Err(message)) => println!("{message}"),
                None => self.ask(line).await?,
            }
            println!();
        }
        Ok(())
    }
}

fn print_answer(answer: &Answer, reranked: bool) {
    println!("{}", answer.text);
    if answer.sources.is_empty() {
        return;
    }
    println!("\nKaynaklar:");
    for source in &answer.sources {
        let location = match source.page {
            Some(page) => format!("{}, Sayfa {page}", source.source),
            None => source.source.clone(),
        };
        if reranked {
            println!(
                "  [{}] {location} (yeniden sıralama {:.3}, benzerlik {:.3})",
                source.index, source.score, source.similarity
            );
        } else {
            println!("  [{}] {location} (benzerlik {:.3})", source.index, source.similarity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_are_not_commands() {
        assert_eq!(Command::parse("KDV oranı nedir?"), None);
        assert_eq!(Command::parse("  "), None);
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(":rerank off"), Some(Ok(Command::Rerank(false))));
        assert_eq!(Command::parse(" :rerank on "), Some(Ok(Command::Rerank(true))));
        assert_eq!(
            Command::parse(":model llama-3.1-8b-instant"),
            Some(Ok(Command::Model(GroqModel::Llama31_8bInstant)))
        );
        assert_eq!(Command::parse(":stats"), Some(Ok(Command::Stats)));
        assert_eq!(Command::parse(":reset"), Some(Ok(Command::Reset)));
        assert_eq!(Command::parse(":quit"), Some(Ok(Command::Quit)));
        assert_eq!(Command::parse(":exit"), Some(Ok(Command::Quit)));
    }

    #[test]
    fn rejects_bad_arguments_and_unknown_commands() {
        assert!(matches!(Command::parse(":rerank maybe"), Some(Err(_))));
        assert!(matches!(Command::parse(":model"), Some(Err(m)) if m.contains("llama-3.3-70b-versatile")));
        assert!(matches!(Command::parse(":model gpt-4"), Some(Err(_))));
        assert!(matches!(Command::parse(":sil"), Some(Err(m)) if m.contains(":sil")));
    }
}
