use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, NamedSource, Report, Result};

use lmc::{disassemble, AsmParser, Console, RunState, Word};

/// Assembler and virtual machine for an extended Little Man Computer.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a source file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a source file or compiled `.lmo` image and print its output
    Run {
        /// Source or `.lmo` file to run, `-` for stdin
        name: PathBuf,
        /// Values for INP, in supply order; the last one is read first
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        input: Vec<Word>,
        /// Give up after this many steps
        #[arg(long)]
        max_steps: Option<u64>,
        /// Print every executed step to stderr
        #[arg(short, long)]
        trace: bool,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Create a binary `.lmo` image to run later
    Compile {
        /// Source file to compile
        name: PathBuf,
        /// Destination to output `.lmo` file
        dest: Option<PathBuf>,
    },
    /// Check a source file without running or outputting binary
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print the assembled memory image with a disassembly of every word
    Dump {
        /// Source file to dump
        name: PathBuf,
    },
}

fn main() -> Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    lmc::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(lmc::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    let Some(command) = args.command else {
        if let Some(path) = args.path {
            return run(&path, Vec::new(), None, false, false);
        }
        println!("\n~ lmc v{VERSION} ~");
        println!("{SHORT_INFO}");
        return Ok(());
    };

    match command {
        Command::Run {
            name,
            input,
            max_steps,
            trace,
            minimal,
        } => run(&name, input, max_steps, trace, minimal),
        Command::Compile { name, dest } => {
            file_message(Green, "Assembling", &name);
            let image = assemble(&name)?;

            let out_file_name = match dest {
                Some(dest) => dest,
                None => default_dest(&name)?,
            };
            let mut file = File::create(&out_file_name).into_diagnostic()?;
            for word in &image {
                file.write_all(&word.to_be_bytes()).into_diagnostic()?;
            }

            message(Green, "Finished", "emit binary");
            file_message(Green, "Saved", &out_file_name);
            Ok(())
        }
        Command::Check { name } => {
            file_message(Green, "Checking", &name);
            let _ = assemble(&name)?;
            message(Green, "Success", "no errors found!");
            Ok(())
        }
        Command::Dump { name } => {
            let src = read_source(&name)?;
            let air = AsmParser::new(&src)
                .and_then(|parser| parser.parse())
                .map_err(|e| with_source(e, &name, &src))?;
            let symbols = air.symbol_table().map_err(|e| with_source(e, &name, &src))?;
            let image = air.emit(&symbols).map_err(|e| with_source(e, &name, &src))?;

            for (addr, (word, stmt)) in image.iter().zip(&air).enumerate() {
                let label = stmt.label.as_ref().map_or("", |label| label.name.as_str());
                let text = match stmt.op.opcode() {
                    Some(_) => disassemble(*word),
                    None => format!("DAT {word}"),
                };
                println!("{addr:>4}  {word:>6}  {label:<12} {text}");
            }

            println!("\n{:>12}", "Symbols".cyan());
            for (label, addr) in symbols.iter() {
                println!("{label:<16} {addr:>4}");
            }
            Ok(())
        }
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, right.as_str());
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn run(
    name: &Path,
    input: Vec<Word>,
    max_steps: Option<u64>,
    trace: bool,
    minimal: bool,
) -> Result<()> {
    if !minimal {
        file_message(MsgColor::Green, "Assembling", name);
    }
    let image = match name.extension().and_then(|ext| ext.to_str()) {
        Some("lmo") => read_image(name)?,
        _ => assemble(name)?,
    };

    let mut program = RunState::from_raw(image).with_input(input);
    program.set_trace(trace || lmc::env::is_trace_enabled());

    if !minimal {
        message(MsgColor::Green, "Running", "emitted binary");
    }
    let mut console = Console::new();
    match max_steps {
        Some(limit) => {
            program.run_bounded(&mut console, limit)?;
        }
        None => program.run(&mut console)?,
    }

    if !minimal {
        if !console.is_line_start() {
            println!();
        }
        message(MsgColor::Cyan, "Halted", "");
        file_message(MsgColor::Green, "Completed", name);
    }
    Ok(())
}

/// Read a whole source file, or stdin for `-`.
fn read_source(name: &Path) -> Result<String> {
    if name == Path::new("-") {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src).into_diagnostic()?;
        return Ok(src);
    }
    fs::read_to_string(name).into_diagnostic()
}

/// Return memory image of source file
fn assemble(name: &Path) -> Result<Vec<Word>> {
    let src = read_source(name)?;
    lmc::assemble(&src).map_err(|e| with_source(e, name, &src))
}

fn with_source(err: lmc::AsmError, name: &Path, src: &str) -> Report {
    Report::new(err).with_source_code(NamedSource::new(name.display().to_string(), src.to_owned()))
}

fn read_image(name: &Path) -> Result<Vec<Word>> {
    let mut buffer = Vec::new();
    File::open(name)
        .and_then(|mut file| file.read_to_end(&mut buffer))
        .into_diagnostic()?;

    if buffer.len() % 8 != 0 {
        bail!("File is not aligned to 64 bits")
    }
    Ok(buffer
        .chunks_exact(8)
        .map(|word| {
            let mut bytes = [0; 8];
            bytes.copy_from_slice(word);
            Word::from_be_bytes(bytes)
        })
        .collect())
}

fn default_dest(name: &Path) -> Result<PathBuf> {
    match name.with_extension("lmo").file_name() {
        Some(file_name) if name != Path::new("-") => Ok(file_name.into()),
        _ => bail!("Cannot derive an output name, please provide a destination"),
    }
}

const SHORT_INFO: &str = r"
Welcome to lmc, an assembler and virtual machine for the Little Man Computer,
extended with a stack, subroutine returns and character output.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
