#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};

use coroutine_stacks::tree;
use pretty_assertions::assert_eq;
use testing_logger::CapturedLog;

pub const DUMP_DIR: &str = "./tests/data/coroutine-stacks/dumps";
pub const RESULT_DIR: &str = "./tests/data/coroutine-stacks/results";
pub const MALFORMED_DIR: &str = "./tests/data/coroutine-stacks/malformed";

pub fn compare_results<R, E>(result: R, mut expected: E, expected_file: &str)
where
    R: BufRead,
    E: BufRead,
{
    let mut buf = String::new();
    let mut line_num = 1;
    for line in result.lines() {
        let line = line.unwrap();
        if expected.read_line(&mut buf).unwrap() == 0 {
            panic!(
                "\noutput has more lines than expected result file: {}",
                expected_file
            );
        }
        assert_eq!(line, buf.trim_end(), "\n{}:{}", expected_file, line_num);
        buf.clear();
        line_num += 1;
    }

    if expected.read_line(&mut buf).unwrap() > 0 {
        panic!(
            "\n{} has more lines than output, beginning at line: {}",
            expected_file, line_num
        )
    }
}

pub fn test_render(test_filename: &str, expected_filename: &str) -> io::Result<()> {
    if let Err(e) = fs::metadata(test_filename) {
        eprintln!("Failed to open input file '{}'", test_filename);
        return Err(e);
    }

    let metadata = match fs::metadata(expected_filename) {
        Ok(m) => m,
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                // be nice to the dev and make the file
                let f = File::create(expected_filename).unwrap();
                tree::from_file(Some(test_filename), f)?;
                fs::metadata(expected_filename).unwrap()
            } else {
                eprintln!("Tried to open {}.", expected_filename);
                return Err(e);
            }
        }
    };

    let expected_len = metadata.len() as usize;
    let mut result = Cursor::new(Vec::with_capacity(expected_len));
    tree::from_file(Some(test_filename), &mut result)?;
    let expected = BufReader::new(File::open(expected_filename)?);
    result.set_position(0);
    compare_results(result, expected, expected_filename);
    Ok(())
}

pub fn test_render_logs<F>(input: &str, asserter: F)
where
    F: Fn(&Vec<CapturedLog>),
{
    testing_logger::setup();
    tree::from_reader(input.as_bytes(), io::sink()).unwrap();
    testing_logger::validate(asserter);
}

pub fn test_render_error(test_filename: &str) -> io::Error {
    if fs::metadata(test_filename).is_err() {
        panic!("Failed to open input file '{}'", test_filename);
    }
    tree::from_file(Some(test_filename), io::sink()).expect_err("Expected an error")
}
