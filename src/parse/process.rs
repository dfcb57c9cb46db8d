//! KNP parser backed by persistent Juman++ and KNP subprocesses
//!
//! Each sentence goes through `jumanpp` then `knp -tab`. Both processes stay
//! alive between queries; every reply ends with an `EOS` line. A query that
//! fails or is cancelled halfway leaves the pipes out of step, so the
//! pipeline is marked dirty and respawned on the next call.

use super::knp::{read_tab, EOS};
use super::traits::{ParseError, ParseOutcome, SentenceParser};
use super::types::ParsedSentence;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Configuration for the Juman++/KNP pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnpConfig {
    /// Path to the `jumanpp` executable
    pub jumanpp_path: String,
    pub jumanpp_args: Vec<String>,
    /// Path to the `knp` executable
    pub knp_path: String,
    pub knp_args: Vec<String>,
    /// Per-sentence timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for KnpConfig {
    fn default() -> Self {
        Self {
            jumanpp_path: "jumanpp".to_string(),
            jumanpp_args: Vec::new(),
            knp_path: "knp".to_string(),
            knp_args: vec!["-tab".to_string()],
            timeout_seconds: 30,
        }
    }
}

/// One long-running analyzer process speaking the EOS-terminated protocol
struct AnalyzerProcess {
    name: String,
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl AnalyzerProcess {
    fn spawn(path: &str, args: &[String]) -> Result<Self, ParseError> {
        let mut process = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ParseError::Unavailable(format!("failed to start {}: {}", path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ParseError::Unavailable(format!("{}: no stdin available", path)))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| ParseError::Unavailable(format!("{}: no stdout available", path)))?;

        Ok(Self {
            name: path.to_string(),
            process,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Write `input` and collect everything up to and including `EOS`
    async fn query(&mut self, input: &str) -> Result<String, ParseError> {
        self.stdin.write_all(input.as_bytes()).await?;
        if !input.ends_with('\n') {
            self.stdin.write_all(b"\n").await?;
        }
        self.stdin.flush().await?;

        let mut output = String::new();
        loop {
            let mut line = String::new();
            let read = self.stdout.read_line(&mut line).await?;
            if read == 0 {
                return Err(ParseError::Io(format!("{} closed its output", self.name)));
            }
            output.push_str(&line);
            if line.trim_end() == EOS {
                return Ok(output);
            }
        }
    }
}

impl Drop for AnalyzerProcess {
    fn drop(&mut self) {
        let _ = self.process.start_kill();
    }
}

struct Pipeline {
    jumanpp: AnalyzerProcess,
    knp: AnalyzerProcess,
    /// Set while a query is in flight; still set afterwards means the
    /// query never completed and the pipes are out of step
    dirty: bool,
}

impl Pipeline {
    fn spawn(config: &KnpConfig) -> Result<Self, ParseError> {
        Ok(Self {
            jumanpp: AnalyzerProcess::spawn(&config.jumanpp_path, &config.jumanpp_args)?,
            knp: AnalyzerProcess::spawn(&config.knp_path, &config.knp_args)?,
            dirty: false,
        })
    }

    async fn analyze(&mut self, sentence: &str) -> Result<String, ParseError> {
        self.dirty = true;
        let morphemes = self.jumanpp.query(sentence).await?;
        let tab = self.knp.query(&morphemes).await?;
        self.dirty = false;
        Ok(tab)
    }
}

/// [`SentenceParser`] that drives local Juman++ and KNP installations
pub struct KnpParser {
    config: KnpConfig,
    pipeline: Mutex<Option<Pipeline>>,
}

impl KnpParser {
    pub fn new(config: KnpConfig) -> Self {
        Self {
            config,
            pipeline: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &KnpConfig {
        &self.config
    }
}

impl Default for KnpParser {
    fn default() -> Self {
        Self::new(KnpConfig::default())
    }
}

#[async_trait]
impl SentenceParser for KnpParser {
    fn id(&self) -> &str {
        "knp"
    }

    async fn parse(&self, sentence: &str) -> ParseOutcome {
        let sentence: String = sentence.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if sentence.trim().is_empty() {
            return Ok(ParsedSentence::new());
        }

        let mut guard = self.pipeline.lock().await;
        if guard.as_ref().is_some_and(|p| p.dirty) {
            tracing::debug!("restarting analyzer pipeline after interrupted query");
            *guard = None;
        }
        if guard.is_none() {
            *guard = Some(Pipeline::spawn(&self.config)?);
        }
        let Some(pipeline) = guard.as_mut() else {
            return Err(ParseError::Unavailable("analyzer pipeline not running".to_string()));
        };

        let limit = Duration::from_secs(self.config.timeout_seconds);
        let result = match timeout(limit, pipeline.analyze(&sentence)).await {
            Ok(result) => result,
            Err(_) => Err(ParseError::Timeout(self.config.timeout_seconds)),
        };

        match result {
            Ok(tab) => read_tab(&tab),
            Err(e) => {
                tracing::warn!(error = %e, "analyzer pipeline failed, dropping it");
                *guard = None;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_runs_knp_in_tab_mode() {
        let config = KnpConfig::default();
        assert_eq!(config.knp_args, vec!["-tab"]);
        assert_eq!(config.jumanpp_path, "jumanpp");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: KnpConfig = serde_yaml::from_str("knp_path: /opt/knp/bin/knp\n").unwrap();
        assert_eq!(config.knp_path, "/opt/knp/bin/knp");
        assert_eq!(config.timeout_seconds, 30);
    }

    #[tokio::test]
    async fn blank_input_skips_the_analyzer() {
        let parser = KnpParser::new(KnpConfig {
            jumanpp_path: "/nonexistent/jumanpp".to_string(),
            ..Default::default()
        });
        let parsed = parser.parse(" \n").await.unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parser.config().jumanpp_path, "/nonexistent/jumanpp");
    }

    #[tokio::test]
    async fn missing_executable_is_unavailable() {
        let parser = KnpParser::new(KnpConfig {
            jumanpp_path: "/nonexistent/jumanpp".to_string(),
            ..Default::default()
        });
        let err = parser.parse("熊が泳ぐ").await.unwrap_err();
        assert!(matches!(err, ParseError::Unavailable(_)));
    }

    #[tokio::test]
    #[ignore = "requires jumanpp and knp on PATH"]
    async fn parses_with_local_installation() {
        let parser = KnpParser::default();
        let parsed = parser.parse("熊が川で泳ぐ").await.unwrap();
        assert!(parsed.chunks.iter().any(|c| c.text == "熊"));
        assert!(parsed.predicates.iter().any(|p| p.text == "泳ぐ"));
    }
}
