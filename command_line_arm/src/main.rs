//! # Arm command line
//!
//! Interactive shell sending telecommands to the arm executable and printing its responses.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Result};
use rustyline::{error::ReadlineError, Editor};
use serde::Deserialize;
use structopt::{clap, StructOpt};

use comms_if::{
    eqpt::arm::ArmData,
    net::{create_socket, zmq, SocketOptions},
    tc::{
        arm_ctrl::{ArmCmd, ArmCmdKind},
        Tc, TcParseError, TcResponse,
    },
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "Arm $ ";
const HISTORY_PATH: &str = "data/arm_history.txt";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Issues commands directly to the arm exec
#[derive(Debug, StructOpt)]
#[structopt(name = "command_line_arm")]
struct Opt {
    /// Telecommand endpoint of the arm exec, overrides the parameter file
    #[structopt(short, long)]
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CliParams {
    tc_endpoint: String,

    /// Units: milliseconds
    response_timeout_ms: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Commands accepted at the prompt.
#[derive(Debug, PartialEq, StructOpt)]
#[structopt(name = "arm", no_version)]
enum Command {
    /// Drive a servo towards its minimum angle
    Minus { servo: String },

    /// Drive a servo towards its maximum angle
    Plus { servo: String },

    /// Stop a servo where it is
    Stop { servo: String },

    /// Drive a servo towards an angle, in degrees
    Angle {
        servo: String,

        #[structopt(allow_hyphen_values = true)]
        angle: i64,
    },

    /// Print the state of every servo
    Snapshot,

    /// Check the arm exec is responding
    Ping,

    /// Leave the shell
    Exit,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not send the TC: {0}")]
    SendError(zmq::Error),

    #[error("No response from the arm exec")]
    NoResponse,

    #[error("Could not recieve the response: {0}")]
    RecvError(zmq::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(TcParseError),
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    let params: CliParams = util::params::load("command_line_arm.toml")
        .wrap_err("Could not load command_line_arm params")?;
    let endpoint = opt.endpoint.unwrap_or(params.tc_endpoint);

    let ctx = zmq::Context::new();
    let socket = create_socket(
        &ctx,
        zmq::REQ,
        SocketOptions {
            req_correlate: true,
            req_relaxed: true,
            linger: 0,
            recv_timeout: params.response_timeout_ms,
            ..Default::default()
        },
        &endpoint,
    )
    .wrap_err("Could not connect to the arm exec")?;

    println!("Connected to {}", endpoint);

    let mut rl = Editor::<(), rustyline::history::DefaultHistory>::new().wrap_err("Could not create the line editor")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled Error: {:?}", err);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let cmd = match parse(&line) {
            Ok(Command::Exit) => break,
            Ok(c) => c,
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        // Ping only cares that the exec answered
        let is_ping = cmd == Command::Ping;

        match send_tc(&socket, &cmd.to_tc()) {
            Ok(TcResponse::Ok) if is_ping => println!("pong"),
            Ok(r) => print_response(&r),
            Err(e) => println!("Error: {}", e),
        }
    }

    if let Err(e) = rl.save_history(HISTORY_PATH) {
        println!("Could not save history: {}", e);
    }

    println!("Exiting...");
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Command {
    /// Telecommand to send for this command.
    ///
    /// [`Command::Exit`] is never sent, it maps to a heartbeat.
    fn to_tc(&self) -> Tc {
        match self {
            Command::Minus { servo } => Tc::Arm(ArmCmd::new(ArmCmdKind::ServoMinus, servo)),
            Command::Plus { servo } => Tc::Arm(ArmCmd::new(ArmCmdKind::ServoPlus, servo)),
            Command::Stop { servo } => Tc::Arm(ArmCmd::new(ArmCmdKind::ServoStop, servo)),
            Command::Angle { servo, angle } => Tc::Arm(ArmCmd::angle(servo, *angle)),
            Command::Snapshot => Tc::Snapshot,
            Command::Ping | Command::Exit => Tc::Heartbeat,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse(line: &str) -> Result<Command, clap::Error> {
    Command::from_iter_safe(std::iter::once("arm").chain(line.split_whitespace()))
}

fn send_tc(socket: &zmq::Socket, tc: &Tc) -> Result<TcResponse, CliError> {
    socket
        .send(&tc.to_json(), 0)
        .map_err(CliError::SendError)?;

    let msg = socket.recv_msg(0).map_err(|e| match e {
        zmq::Error::EAGAIN => CliError::NoResponse,
        e => CliError::RecvError(e),
    })?;

    TcResponse::from_json(msg.as_str().unwrap_or("")).map_err(CliError::InvalidResponse)
}

fn print_response(response: &TcResponse) {
    match response {
        TcResponse::Ok => println!("Ok"),
        TcResponse::Rejected(r) => println!("Rejected: {}", r),
        TcResponse::Invalid(r) => println!("Invalid: {}", r),
        TcResponse::Snapshot(data) => print!("{}", format_snapshot(data)),
    }
}

fn format_snapshot(data: &ArmData) -> String {
    let mut out = format!("{}\n", data.name);
    for s in data.data.iter() {
        out.push_str(&format!(
            "  {:<10} {:>3} deg  [{:>3}, {:>3}]\n",
            s.servo, s.angle, s.min, s.max
        ));
    }
    out
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
