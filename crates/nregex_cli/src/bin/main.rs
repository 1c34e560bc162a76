use nregex::regex_limits::RECURSION_STACK_BYTES;
use nregex::{CompileFlags, DelimiterTable, ExecOptions, Regex};
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process;

const VERSION: &str = "nrx 0.3.0";

/// Searches run on a thread with this much stack so long lines can
/// backtrack deeper than the library default allows.
const SEARCH_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Half the search stack, spent on matcher recursion.
const RECURSION_LIMIT: usize = SEARCH_STACK_SIZE / 2 / RECURSION_STACK_BYTES;

fn print_usage() {
    eprintln!("usage: nrx [options] pattern [file...]");
    eprintln!("Available options are:");
    eprintln!("  -i        ignore case");
    eprintln!("  -n        prefix lines with their line number");
    eprintln!("  -o        print only the matched text");
    eprintln!("  -c        print the number of matching lines");
    eprintln!("  -r tmpl   print lines with every match replaced by 'tmpl'");
    eprintln!("  -w chars  word delimiters for <, >, \\y and \\B");
    eprintln!("  -N        treat '{{' as an ordinary character");
    eprintln!("  --json    one JSON record per match");
    eprintln!("  -v        show version information");
    eprintln!("  -h        show this help");
    eprintln!("  --        stop handling options");
}

#[derive(Default)]
struct Options {
    pattern: Option<String>,
    files: Vec<String>,
    ignore_case: bool,
    line_numbers: bool,
    only_matching: bool,
    count: bool,
    replace: Option<String>,
    delimiters: Option<String>,
    no_counting: bool,
    json: bool,
    show_version: bool,
    show_help: bool,
}

#[derive(Serialize)]
struct MatchRecord<'a> {
    file: &'a str,
    line: usize,
    start: usize,
    end: usize,
    text: String,
    groups: Vec<Option<String>>,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options::default();
    let mut i = 1;
    let mut stop_options = false;

    while i < args.len() {
        let arg = &args[i];

        if !stop_options && arg.starts_with('-') && arg.len() > 1 {
            match arg.as_str() {
                "-i" => opts.ignore_case = true,
                "-n" => opts.line_numbers = true,
                "-o" => opts.only_matching = true,
                "-c" => opts.count = true,
                "-N" => opts.no_counting = true,
                "-v" => opts.show_version = true,
                "-h" => opts.show_help = true,
                "--json" => opts.json = true,
                "-r" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("'-r' needs argument".to_string());
                    }
                    opts.replace = Some(args[i].clone());
                }
                "-w" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("'-w' needs argument".to_string());
                    }
                    opts.delimiters = Some(args[i].clone());
                }
                "--" => stop_options = true,
                _ => return Err(format!("unrecognized option '{}'", arg)),
            }
        } else if opts.pattern.is_none() {
            opts.pattern = Some(arg.clone());
        } else {
            opts.files.push(arg.clone());
        }
        i += 1;
    }

    Ok(opts)
}

struct Grep<'a> {
    regex: Regex,
    opts: &'a Options,
    delimiters: Option<DelimiterTable>,
    matched_lines: usize,
}

impl Grep<'_> {
    /// Next match at or after `start`.
    fn find(&mut self, line: &[u8], start: usize) -> Option<std::ops::Range<usize>> {
        let options = ExecOptions {
            start,
            delimiters: self.delimiters.as_ref(),
            recursion_limit: Some(RECURSION_LIMIT),
            ..Default::default()
        };
        if self.regex.execute(line, &options) {
            self.regex.span()
        } else {
            None
        }
    }

    fn run(&mut self, name: &str, mut reader: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            self.process_line(name, line_no, &buf, out)?;
        }
        Ok(())
    }

    fn process_line(
        &mut self,
        name: &str,
        line_no: usize,
        line: &[u8],
        out: &mut impl Write,
    ) -> io::Result<()> {
        if self.find(line, 0).is_none() {
            return Ok(());
        }
        self.matched_lines += 1;

        if self.opts.count {
            return Ok(());
        }
        if self.opts.json {
            return self.write_json(name, line_no, line, out);
        }
        if self.opts.only_matching {
            let mut pos = 0;
            while pos <= line.len() {
                let Some(span) = self.find(line, pos) else {
                    break;
                };
                if span.start != span.end {
                    self.write_prefix(line_no, out)?;
                    out.write_all(&line[span.clone()])?;
                    out.write_all(b"\n")?;
                }
                pos = if span.start == span.end { span.end + 1 } else { span.end };
            }
            return Ok(());
        }

        self.write_prefix(line_no, out)?;
        match self.opts.replace.as_deref() {
            Some(template) => {
                let replaced = self.replace_line(line, template.as_bytes());
                out.write_all(&replaced)?;
            }
            None => out.write_all(line)?,
        }
        out.write_all(b"\n")
    }

    fn replace_line(&mut self, line: &[u8], template: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(line.len());
        let mut pos = 0;
        let mut copy_from = 0;

        while pos <= line.len() {
            let Some(span) = self.find(line, pos) else {
                break;
            };
            result.extend_from_slice(&line[copy_from..span.start]);
            self.regex.substitute(line, template, &mut result);
            if span.start == span.end {
                if let Some(&c) = line.get(span.end) {
                    result.push(c);
                }
                pos = span.end + 1;
                copy_from = pos.min(line.len());
            } else {
                pos = span.end;
                copy_from = span.end;
            }
        }

        result.extend_from_slice(&line[copy_from..]);
        result
    }

    fn write_prefix(&self, line_no: usize, out: &mut impl Write) -> io::Result<()> {
        if self.opts.line_numbers {
            let mut digits = itoa::Buffer::new();
            out.write_all(digits.format(line_no).as_bytes())?;
            out.write_all(b":")?;
        }
        Ok(())
    }

    fn write_json(
        &mut self,
        name: &str,
        line_no: usize,
        line: &[u8],
        out: &mut impl Write,
    ) -> io::Result<()> {
        let mut pos = 0;
        while pos <= line.len() {
            let Some(span) = self.find(line, pos) else {
                break;
            };
            let groups = (1..=self.regex.group_count())
                .map(|n| {
                    self.regex
                        .group(n)
                        .map(|g| String::from_utf8_lossy(&line[g]).into_owned())
                })
                .collect();
            let record = MatchRecord {
                file: name,
                line: line_no,
                start: span.start,
                end: span.end,
                text: String::from_utf8_lossy(&line[span.clone()]).into_owned(),
                groups,
            };
            serde_json::to_writer(&mut *out, &record).map_err(io::Error::other)?;
            out.write_all(b"\n")?;
            pos = if span.start == span.end { span.end + 1 } else { span.end };
        }
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let builder = std::thread::Builder::new()
        .name("nrx-search".into())
        .stack_size(SEARCH_STACK_SIZE);
    let handle = match builder.spawn(nrx_main) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("nrx: cannot start search thread: {}", e);
            process::exit(2);
        }
    };

    match handle.join() {
        Ok(code) => process::exit(code),
        Err(_) => {
            eprintln!("nrx: internal error (thread panicked)");
            process::exit(2);
        }
    }
}

fn nrx_main() -> i32 {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("nrx: {}", e);
            print_usage();
            return 2;
        }
    };

    if opts.show_version {
        println!("{}", VERSION);
        return 0;
    }
    if opts.show_help {
        print_usage();
        return 0;
    }

    let Some(pattern) = opts.pattern.as_deref() else {
        print_usage();
        return 2;
    };

    let flags = CompileFlags {
        case_insensitive: opts.ignore_case,
        counting_quantifier: !opts.no_counting,
        ..CompileFlags::default()
    };
    let regex = match Regex::with_flags(pattern, flags) {
        Ok(regex) => regex,
        Err(e) => {
            eprintln!("nrx: invalid pattern: {}", e);
            if let Some(pos) = e.position {
                eprintln!("  {}", pattern);
                eprintln!("  {}^", " ".repeat(pos.min(pattern.len())));
            }
            return 2;
        }
    };

    log::debug!(
        "compiled {:?}: {} groups, {} nodes",
        pattern,
        regex.group_count(),
        regex.program().nodes().len()
    );

    let mut grep = Grep {
        regex,
        opts: &opts,
        delimiters: opts.delimiters.as_deref().map(|d| DelimiterTable::new(d.as_bytes())),
        matched_lines: 0,
    };

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut had_error = false;

    if opts.files.is_empty() {
        let stdin = io::stdin();
        if let Err(e) = grep.run("-", stdin.lock(), &mut out) {
            eprintln!("nrx: error reading stdin: {}", e);
            had_error = true;
        }
    } else {
        for file in &opts.files {
            let result = File::open(file).and_then(|f| grep.run(file, BufReader::new(f), &mut out));
            if let Err(e) = result {
                eprintln!("nrx: {}: {}", file, e);
                had_error = true;
            }
        }
    }

    if opts.count {
        let mut digits = itoa::Buffer::new();
        let _ = writeln!(out, "{}", digits.format(grep.matched_lines));
    }
    if let Err(e) = out.flush() {
        eprintln!("nrx: {}", e);
        had_error = true;
    }

    if had_error {
        2
    } else if grep.matched_lines == 0 {
        1
    } else {
        0
    }
}
