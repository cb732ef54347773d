use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::mem;
use std::path::Path;

const READER_CAPACITY: usize = 128 * 1024;

// Everything after this marker on a header line is the coroutine's state.
static STATE_MARKER: &str = "state: ";

/// One entry of a coroutine dump.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coroutine {
    /// The state label from the header line, e.g. `RUNNING` or `SUSPENDED`.
    pub state: String,

    /// Stack frames in the order they appear in the dump, innermost frame first.
    pub stack_trace: Vec<String>,
}

impl Coroutine {
    /// Creates a coroutine in the given state with an empty stack trace.
    pub fn new<S: Into<String>>(state: S) -> Self {
        Coroutine {
            state: state.into(),
            stack_trace: Vec::new(),
        }
    }
}

/// A header line that does not declare a state.
///
/// Returned wrapped in an [`io::Error`] of kind [`io::ErrorKind::InvalidData`]; use
/// [`io::Error::get_ref`] and `downcast_ref` to get at it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number of the offending header.
    pub line_number: usize,
    /// The offending header, trimmed.
    pub line: String,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coroutine header on line {} has no `{}` marker: {}",
            self.line_number,
            STATE_MARKER.trim_end(),
            self.line
        )
    }
}

impl Error for FormatError {}

impl From<FormatError> for io::Error {
    fn from(e: FormatError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

/// Parses an in-memory dump.
///
/// See [`from_reader`] for the accepted format.
pub fn parse(input: &str) -> io::Result<Vec<Coroutine>> {
    from_reader(input.as_bytes())
}

/// Parses a dump from any buffered reader.
///
/// The input is line-oriented:
///
/// ```text
/// "coroutine#1":StandaloneCoroutine{Active}@1a2b3c, state: SUSPENDED
///     at com.example.Foo.bar(Foo.kt:12)
///     at com.example.Foo$baz$1.invokeSuspend(Foo.kt:30)
/// ```
///
/// A line starting with `"` opens a new coroutine whose state is everything after `state: `.
/// Every other non-blank line is a stack frame of the most recently opened coroutine. Lines are
/// trimmed, blank lines are skipped, and lines before the first header are ignored.
///
/// A header without a `state: ` marker aborts parsing with a [`FormatError`].
pub fn from_reader<R>(mut reader: R) -> io::Result<Vec<Coroutine>>
where
    R: BufRead,
{
    let mut parser = Parser::default();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        parser.on_line(&line)?;
    }
    let coroutines = parser.finish();
    debug!("Parsed {} coroutines", coroutines.len());
    Ok(coroutines)
}

/// Parses the dump in a file, or on STDIN if `infile` is `None`.
pub fn from_file<P>(infile: Option<P>) -> io::Result<Vec<Coroutine>>
where
    P: AsRef<Path>,
{
    match infile {
        Some(ref path) => {
            let file = File::open(path)?;
            from_reader(io::BufReader::with_capacity(READER_CAPACITY, file))
        }
        None => {
            let stdin = io::stdin();
            let stdin_guard = stdin.lock();
            from_reader(io::BufReader::with_capacity(READER_CAPACITY, stdin_guard))
        }
    }
}

#[derive(Default)]
struct Parser {
    coroutines: Vec<Coroutine>,

    /// The coroutine whose frames we are currently reading, if any.
    current: Option<Coroutine>,

    line_number: usize,
}

impl Parser {
    fn on_line(&mut self, line: &str) -> io::Result<()> {
        self.line_number += 1;
        // The marker is matched before trimming the end, so `state: ` with an empty
        // label still counts.
        let untrimmed = line.trim_start();
        let line = untrimmed.trim_end();

        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with('"') {
            let state = match untrimmed.find(STATE_MARKER) {
                Some(start) => untrimmed[start + STATE_MARKER.len()..].trim_end(),
                None => {
                    return Err(FormatError {
                        line_number: self.line_number,
                        line: line.to_string(),
                    }
                    .into())
                }
            };
            trace!("Coroutine header on line {}: {}", self.line_number, state);
            if let Some(done) = mem::replace(&mut self.current, Some(Coroutine::new(state))) {
                self.coroutines.push(done);
            }
        } else if let Some(ref mut current) = self.current {
            current.stack_trace.push(line.to_string());
        } else {
            warn!(
                "Ignoring line {} before the first coroutine header: {}",
                self.line_number, line
            );
        }

        Ok(())
    }

    fn finish(mut self) -> Vec<Coroutine> {
        if let Some(done) = self.current.take() {
            self.coroutines.push(done);
        }
        self.coroutines
    }
}
