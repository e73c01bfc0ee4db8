use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context as _};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use exprcalc::{
    calculator::format_value, convert, programmer, AngleMode, Calculator, Parser,
};

lazy_static! {
    static ref ASSIGN_RE: Regex =
        Regex::new(r"^\s*(?P<name>\p{Alphabetic}[\p{Alphabetic}0-9_]*)\s*=(?P<expr>.*)$").unwrap();
    static ref MEMORY_RE: Regex = Regex::new(r"^m(?P<op>[+-])\s+(?P<expr>.+)$").unwrap();
}

fn app() -> App<'static, 'static> {
    App::new("exprcalc")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("degrees")
                .short("d")
                .long("degrees")
                .help("Interpret trigonometric angles in degrees"),
        )
        .arg(
            Arg::with_name("ast")
                .long("ast")
                .help("Print the parsed expression tree before evaluating"),
        )
        .arg(
            Arg::with_name("expression")
                .multiple(true)
                .help("Expression to evaluate; starts an interactive session when omitted"),
        )
        .subcommand(
            SubCommand::with_name("convert")
                .setting(AppSettings::AllowNegativeNumbers)
                .about("Convert a value between units (m cm ft kg lb C F K)")
                .arg(Arg::with_name("value").required(true))
                .arg(Arg::with_name("from").required(true))
                .arg(Arg::with_name("to").required(true)),
        )
        .subcommand(
            SubCommand::with_name("base")
                .setting(AppSettings::AllowNegativeNumbers)
                .about("Convert an integer between number bases (2 to 36)")
                .arg(Arg::with_name("value").required(true))
                .arg(Arg::with_name("from").required(true))
                .arg(Arg::with_name("to").required(true)),
        )
        .subcommand(
            SubCommand::with_name("bits")
                .setting(AppSettings::AllowNegativeNumbers)
                .about("Apply a 64-bit bitwise operation (and or xor not shl shr)")
                .arg(Arg::with_name("operation").required(true))
                .arg(Arg::with_name("a").required(true))
                .arg(Arg::with_name("b")),
        )
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing argument {}", name))
}

fn run_convert(matches: &ArgMatches) -> anyhow::Result<()> {
    let value: f64 = arg(matches, "value")?
        .parse()
        .context("value must be a number")?;
    let converted = convert::convert_str(value, arg(matches, "from")?, arg(matches, "to")?)?;
    println!("{}", format_value(converted));
    Ok(())
}

fn run_base(matches: &ArgMatches) -> anyhow::Result<()> {
    let from: u32 = arg(matches, "from")?.parse().context("invalid source base")?;
    let to: u32 = arg(matches, "to")?.parse().context("invalid target base")?;
    println!("{}", programmer::convert_base(arg(matches, "value")?, from, to)?);
    Ok(())
}

fn run_bits(matches: &ArgMatches) -> anyhow::Result<()> {
    let operation = arg(matches, "operation")?
        .parse::<programmer::BitwiseOperation>()
        .map_err(|e| anyhow!(e))?;
    let a: i64 = arg(matches, "a")?.parse().context("operand must be an integer")?;
    let b: i64 = match matches.value_of("b") {
        Some(b) => b.parse().context("operand must be an integer")?,
        None => 0,
    };
    println!("{}", programmer::bitwise(a, b, operation));
    Ok(())
}

fn print_ast(source: &str) {
    match Parser::default().parse_str(source) {
        Ok(expr) => println!("{}", expr),
        Err(err) => println!("Error: {}", err),
    }
}

/// Handle a single interactive line. Returns `false` when the session ends.
fn handle_line(calculator: &mut Calculator, line: &str, show_ast: bool) -> bool {
    let line = line.trim();
    match line {
        "" => return true,
        "quit" | "exit" => return false,
        "history" => {
            for entry in calculator.history().entries() {
                println!("{}", entry);
            }
            return true;
        }
        "clear" => {
            calculator.clear_history();
            return true;
        }
        "vars" => {
            let mut vars: Vec<_> = calculator.context().variables().collect();
            vars.sort_by(|a, b| a.0.cmp(b.0));
            for (name, value) in vars {
                println!("{} = {}", name, format_value(value));
            }
            return true;
        }
        "mc" => {
            calculator.memory_clear();
            return true;
        }
        "mr" => {
            println!("{}", format_value(calculator.memory()));
            return true;
        }
        _ => (),
    }

    let result = if let Some(cap) = ASSIGN_RE.captures(line) {
        let name = &cap["name"];
        let expr = &cap["expr"];
        debug!("assigning {} = {}", name, expr);
        calculator.assign(name, expr)
    } else if let Some(cap) = MEMORY_RE.captures(line) {
        calculator.evaluate(&cap["expr"]).map(|value| {
            if &cap["op"] == "+" {
                calculator.memory_add(value);
            } else {
                calculator.memory_subtract(value);
            }
            value
        })
    } else {
        if show_ast {
            print_ast(line);
        }
        calculator.evaluate(line)
    };

    match result {
        Ok(value) => println!("{}", format_value(value)),
        Err(err) => println!("Error: {}", err),
    }
    true
}

fn repl(calculator: &mut Calculator, show_ast: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !handle_line(calculator, &line, show_ast) {
            break;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let matches = app().get_matches();

    match matches.subcommand() {
        ("convert", Some(sub)) => return run_convert(sub),
        ("base", Some(sub)) => return run_base(sub),
        ("bits", Some(sub)) => return run_bits(sub),
        _ => (),
    }

    let mut calculator = Calculator::new();
    if matches.is_present("degrees") {
        calculator.set_angle_mode(AngleMode::Degrees);
    }
    let show_ast = matches.is_present("ast");

    match matches.values_of("expression") {
        Some(values) => {
            let source = values.collect::<Vec<&str>>().join(" ");
            if show_ast {
                print_ast(&source);
            }
            let value = calculator.evaluate(&source)?;
            println!("{}", format_value(value));
            Ok(())
        }
        None => repl(&mut calculator, show_ast),
    }
}
