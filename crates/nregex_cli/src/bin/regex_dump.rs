use nregex::{CompileFlags, Node, Operand, Program, Regex};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut flags = CompileFlags::default();
    let mut pattern = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "-i" => flags.case_insensitive = true,
            "-n" => flags.match_newline = true,
            "-N" => flags.counting_quantifier = false,
            _ => pattern = Some(arg.clone()),
        }
    }

    let Some(pattern) = pattern else {
        println!("Usage: regex_dump [-i] [-n] [-N] <pattern>");
        std::process::exit(0);
    };

    let regex = match Regex::with_flags(&pattern, flags) {
        Ok(regex) => regex,
        Err(e) => {
            eprintln!("Compilation error at offset {}: {}", e.position.unwrap_or(0), e);
            std::process::exit(1);
        }
    };

    println!("=== {} ===", pattern);
    dump_program(&regex);
}

fn dump_program(regex: &Regex) {
    let program = regex.program();
    println!(
        "groups: {}, counters: {}, nodes: {}",
        program.num_groups(),
        program.num_counters(),
        program.nodes().len()
    );
    match regex.match_start() {
        Some(c) => println!("match start: {:?}", c as char),
        None => println!("match start: -"),
    }
    println!("anchored: {}", regex.is_anchored());
    println!();

    for (index, node) in program.nodes().iter().enumerate() {
        let next = match program.next(index) {
            Some(n) => format!("-> {}", n),
            None => "-> end".to_string(),
        };
        println!(
            "{:5}  {:<18} {:<10} {}",
            index,
            node.op.name(),
            next,
            operand_detail(node)
        );
    }
    println!();
    println!("{} bytes serialized", serialized_len(program));
}

fn operand_detail(node: &Node) -> String {
    match &node.operand {
        Operand::None => String::new(),
        Operand::Literal(text) => format!("{:?}", String::from_utf8_lossy(text)),
        Operand::Set(set) => {
            let members: String = set
                .iter()
                .map(|c| match c {
                    b'\n' => "\\n".to_string(),
                    b'\t' => "\\t".to_string(),
                    0x20..=0x7e => (c as char).to_string(),
                    _ => format!("\\x{:02x}", c),
                })
                .collect();
            format!("[{}] ({} chars)", members, set.len())
        }
        Operand::Range { min, max } => {
            if *max == 0 {
                format!("{{{},}}", min)
            } else {
                format!("{{{},{}}}", min, max)
            }
        }
        Operand::Counter(index) => format!("counter {}", index),
        Operand::Test { index, limit } => format!("counter {} < {}", index, limit),
        Operand::Bounds { lower, upper } => format!("length {}..={}", lower, upper),
        Operand::Group(n) => format!("group {}", n),
    }
}

fn serialized_len(program: &Program) -> usize {
    program.to_bytes().len()
}
