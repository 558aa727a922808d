use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyclip::clipboard::{
    self, ClipboardBackend, Encoding, ErrorPolicy, Payload, TransferOptions,
};
use anyclip::config::{self, Config, ConfigStorage, TomlConfigStorage};
use anyclip::logging;

#[derive(Parser)]
#[command(name = "anyclip")]
#[command(version, about = "Cross-platform clipboard for text and binary data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy contents from stdin to the clipboard
    Copy {
        /// Decode stdin as text instead of copying raw bytes
        #[arg(short, long)]
        text: bool,

        /// Encoding of stdin (implies --text)
        #[arg(short, long)]
        encoding: Option<String>,
    },

    /// Output clipboard contents to stdout
    Paste {
        /// Read the clipboard as text
        #[arg(short, long)]
        text: bool,

        /// Encoding written to stdout (implies --text)
        #[arg(short, long)]
        encoding: Option<String>,

        /// Error handling for undecodable or unencodable text:
        /// strict, replace or ignore (implies --text)
        #[arg(long)]
        errors: Option<String>,
    },

    /// Clear the clipboard contents
    Clear,

    /// List the formats currently on the clipboard
    Formats,

    /// Write the default configuration file
    InitConfig,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match parse_failure_status(&e) {
            Some(status) => {
                let _ = e.print();
                return ExitCode::from(status);
            }
            None => e.exit(),
        },
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("anyclip: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Exit status for a command line that did not parse
/// `None` for help and version output, which exit normally
fn parse_failure_status(e: &clap::Error) -> Option<u8> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(1),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_storage = TomlConfigStorage::new(config::config_path()?);
    let config = config_storage.load()?;

    match &config.logging.file {
        Some(path) => logging::init_file_logger(path, &config.logging.level)?,
        None => logging::init_stderr_logger(&config.logging.level),
    }

    match cli.command {
        Commands::Copy { text, encoding } => {
            let options = stream_options(&config, text, encoding, None)?;
            let clip = clipboard::init(&config.general)?;
            cmd_copy(clip, &mut io::stdin().lock(), &options)
        }
        Commands::Paste {
            text,
            encoding,
            errors,
        } => {
            let options = stream_options(&config, text, encoding, errors)?;
            let clip = clipboard::init(&config.general)?;
            cmd_paste(clip, &mut io::stdout().lock(), &options)
        }
        Commands::Clear => cmd_clear(clipboard::init(&config.general)?),
        Commands::Formats => cmd_formats(clipboard::init(&config.general)?),
        Commands::InitConfig => config_storage.create_default(),
    }
}

/// Text handling of stdin/stdout from flags, falling back to the configured encoding
///
/// The encoding always describes the stream. Clipboard text is held natively
/// (UTF-8, or UTF-16 on Windows), so `copy -e E` and `paste -e E` round-trip.
fn stream_options(
    config: &Config,
    text: bool,
    encoding: Option<String>,
    errors: Option<String>,
) -> Result<TransferOptions> {
    let mut options = TransferOptions::new();
    options.text = text;
    if let Some(name) = encoding {
        options.encoding = Some(name.parse::<Encoding>()?);
    } else if text {
        if let Some(name) = &config.general.encoding {
            options.encoding = Some(name.parse::<Encoding>()?);
        }
    }
    if let Some(policy) = errors {
        options.errors = Some(policy.parse::<ErrorPolicy>()?);
    }
    Ok(options)
}

/// Copy `input` to the clipboard
fn cmd_copy(
    clip: &dyn ClipboardBackend,
    input: &mut impl Read,
    options: &TransferOptions,
) -> Result<()> {
    let mut buffer = Vec::new();
    input
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;

    let payload = if options.wants_text() {
        let text = options
            .encoding_or_default()
            .decode(&buffer, options.policy())
            .context("Standard input is not valid text in the requested encoding")?;
        Payload::Text(text)
    } else {
        Payload::Bytes(buffer)
    };

    clip.copy(&payload, &TransferOptions::new())?;
    log::info!("Copied {} bytes to the clipboard", payload.as_bytes().len());
    Ok(())
}

/// Write the clipboard to `output`
fn cmd_paste(
    clip: &dyn ClipboardBackend,
    output: &mut impl Write,
    options: &TransferOptions,
) -> Result<()> {
    let bytes = if options.wants_text() {
        let read = TransferOptions::text().with_errors(options.policy());
        let payload = clip.paste(&read)?;
        options
            .encoding_or_default()
            .encode(payload.as_text().unwrap_or_default(), options.policy())
            .context("Clipboard text cannot be written in the requested encoding")?
    } else {
        clip.paste(&TransferOptions::new())?.into_bytes()
    };

    output
        .write_all(&bytes)
        .context("Failed to write to stdout")?;
    output.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn cmd_clear(clip: &dyn ClipboardBackend) -> Result<()> {
    clip.clear()?;
    Ok(())
}

fn cmd_formats(clip: &dyn ClipboardBackend) -> Result<()> {
    let formats = clip.formats()?;

    if formats.is_empty() {
        println!("(clipboard is empty)");
    }
    for format in formats {
        println!("{:>6}  {}", format.id, format.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyclip::clipboard::PbcopyBackend;
    use anyclip::clipboard::process::{CommandOutput, CommandRunner, CommandSpec, Tool};
    use std::sync::Mutex;

    /// Stands in for pbcopy/pbpaste: whatever is piped in is pasted back
    #[derive(Default)]
    struct MemoryRunner {
        contents: Mutex<Vec<u8>>,
    }

    impl CommandRunner for MemoryRunner {
        fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
            let mut contents = self.contents.lock().unwrap();
            let stdout = match &spec.input {
                Some(input) => {
                    *contents = input.clone();
                    Vec::new()
                }
                None => contents.clone(),
            };
            Ok(CommandOutput {
                code: Some(0),
                stdout,
                stderr: Vec::new(),
            })
        }
    }

    fn memory_clipboard() -> PbcopyBackend {
        PbcopyBackend::with_runner(
            Tool::at("pbcopy", "/usr/bin/pbcopy"),
            Tool::at("pbpaste", "/usr/bin/pbpaste"),
            Box::new(MemoryRunner::default()),
        )
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["anyclip", "paste", "--encoding", "latin-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Paste {
                text: false,
                encoding: Some(_),
                errors: None
            }
        ));
        assert!(Cli::try_parse_from(["anyclip", "clear"]).is_ok());
    }

    #[test]
    fn test_unrecognized_command_exits_with_one() {
        let err = Cli::try_parse_from(["anyclip", "nonexistent"]).err().unwrap();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument
        ));
        assert_eq!(parse_failure_status(&err), Some(1));

        let help = Cli::try_parse_from(["anyclip", "--help"]).err().unwrap();
        assert_eq!(parse_failure_status(&help), None);
    }

    #[test]
    fn test_copy_paste_clear() {
        let clip = memory_clipboard();
        let bytes = TransferOptions::new();

        cmd_copy(&clip, &mut &b"foo"[..], &bytes).unwrap();
        let mut stdout = Vec::new();
        cmd_paste(&clip, &mut stdout, &bytes).unwrap();
        assert_eq!(stdout, b"foo");

        cmd_clear(&clip).unwrap();
        assert_eq!(clip.paste(&bytes).unwrap(), Payload::Bytes(vec![]));
    }

    #[test]
    fn test_encoding_describes_the_stream() {
        let clip = memory_clipboard();
        let utf16 = TransferOptions::new().with_encoding(Encoding::Utf16Le);
        let input: Vec<u8> = "héllo".encode_utf16().flat_map(u16::to_le_bytes).collect();

        cmd_copy(&clip, &mut input.as_slice(), &utf16).unwrap();
        // the clipboard holds native text
        assert_eq!(clip.paste(&TransferOptions::text()).unwrap(), Payload::from("héllo"));

        let mut stdout = Vec::new();
        cmd_paste(&clip, &mut stdout, &utf16).unwrap();
        assert_eq!(stdout, input);

        let mut stdout = Vec::new();
        let ascii = TransferOptions::new()
            .with_encoding(Encoding::Ascii)
            .with_errors(ErrorPolicy::Replace);
        cmd_paste(&clip, &mut stdout, &ascii).unwrap();
        assert_eq!(stdout, b"h?llo");
    }

    #[test]
    fn test_stream_options_from_flags() {
        let mut config = Config::default();
        let options = stream_options(&config, false, None, None).unwrap();
        assert!(!options.wants_text());

        config.general.encoding = Some("latin-1".to_string());
        let options = stream_options(&config, true, None, Some("replace".to_string())).unwrap();
        assert_eq!(options.encoding, Some(Encoding::Latin1));
        assert_eq!(options.errors, Some(ErrorPolicy::Replace));

        // configured encoding only applies in text mode
        let options = stream_options(&config, false, None, None).unwrap();
        assert_eq!(options.encoding, None);

        assert!(stream_options(&config, false, Some("klingon".to_string()), None).is_err());
    }
}
