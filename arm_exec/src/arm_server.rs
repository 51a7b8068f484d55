//! # Arm Server Module
//!
//! This module abstracts over the networking side of the arm executable. The server accepts
//! telecommands from operators on a REP socket, replying to each one, and publishes telemetry on
//! a PUB socket.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::arm::ArmData,
    net::{create_socket, zmq, NetError, NetParams, SocketOptions},
    tc::{Tc, TcParseError, TcResponse},
};

use crate::arm_ctrl::StatusReport;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Time the server waits for a telecommand before reporting there is none.
///
/// Units: milliseconds
const TC_RECV_TIMEOUT_MS: i32 = 5;

/// Time the server waits for a message to be accepted by the socket.
///
/// Units: milliseconds
const SEND_TIMEOUT_MS: i32 = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the networking part of the arm executable.
pub struct ArmServer {
    /// REP socket which accepts telecommands
    tc_socket: zmq::Socket,

    /// PUB socket which sends telemetry
    tm_socket: zmq::Socket,
}

/// Telemetry packet published by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmPacket {
    /// Time since the start of the session
    ///
    /// Units: seconds
    pub elapsed_s: f64,

    /// Snapshot of every servo on the arm
    pub arm: ArmData,

    /// True if every servo has reached its desired angle
    pub converged: bool,

    /// Number of pulses which failed on the last convergence step
    pub pulse_errors: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`ArmServer`]
#[derive(thiserror::Error, Debug)]
pub enum ArmServerError {
    #[error("Socket error: {0}")]
    SocketError(#[from] NetError),

    #[error("Could not recieve from the client: {0}")]
    RecvError(zmq::Error),

    #[error("Could not send data to the client: {0}")]
    SendError(zmq::Error),

    #[error("Could not parse the TC: {0}")]
    TcParseError(TcParseError),

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmServer {
    /// Create a new instance of the arm server.
    ///
    /// This function will not wait for a connection from any client before returning.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, ArmServerError> {
        let tc_socket_options = SocketOptions {
            bind: true,
            linger: 0,
            recv_timeout: TC_RECV_TIMEOUT_MS,
            send_timeout: SEND_TIMEOUT_MS,
            ..Default::default()
        };
        let tm_socket_options = SocketOptions {
            bind: true,
            linger: 0,
            send_timeout: SEND_TIMEOUT_MS,
            ..Default::default()
        };

        let tc_socket = create_socket(ctx, zmq::REP, tc_socket_options, &params.tc_endpoint)?;
        let tm_socket = create_socket(ctx, zmq::PUB, tm_socket_options, &params.tm_endpoint)?;

        Ok(Self {
            tc_socket,
            tm_socket,
        })
    }

    /// Retrieve a telecommand from a client.
    ///
    /// `Ok(None)` is returned if no telecommand arrived before the timeout. Otherwise the user
    /// MUST call [`ArmServer::send_response`] before calling this function again, including when
    /// the TC could not be parsed.
    pub fn get_tc(&mut self) -> Result<Option<Tc>, ArmServerError> {
        let msg = match self.tc_socket.recv_msg(0) {
            Ok(m) => m,
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(ArmServerError::RecvError(e)),
        };

        Tc::from_json(msg.as_str().unwrap_or(""))
            .map(Some)
            .map_err(ArmServerError::TcParseError)
    }

    /// Send the response to the last recieved telecommand.
    pub fn send_response(&mut self, response: &TcResponse) -> Result<(), ArmServerError> {
        let resp_str = response
            .to_json()
            .map_err(ArmServerError::SerializationError)?;

        self.tc_socket
            .send(&resp_str, 0)
            .map_err(ArmServerError::SendError)
    }

    /// Publish a telemetry packet to all subscribers.
    pub fn publish(&mut self, packet: &TmPacket) -> Result<(), ArmServerError> {
        let tm_str = serde_json::to_string(packet).map_err(ArmServerError::SerializationError)?;

        self.tm_socket
            .send(&tm_str, 0)
            .map_err(ArmServerError::SendError)
    }
}

impl TmPacket {
    pub fn new(arm: ArmData, status: &StatusReport) -> Self {
        Self {
            elapsed_s: util::session::get_elapsed_seconds(),
            arm,
            converged: status.converged,
            pulse_errors: status.pulse_errors,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::arm_ctrl::ArmCmd;

    fn server(ctx: &zmq::Context, name: &str) -> ArmServer {
        ArmServer::new(
            ctx,
            &NetParams {
                tc_endpoint: format!("inproc://{}-tc", name),
                tm_endpoint: format!("inproc://{}-tm", name),
            },
        )
        .unwrap()
    }

    fn client(ctx: &zmq::Context, name: &str) -> zmq::Socket {
        create_socket(
            ctx,
            zmq::REQ,
            SocketOptions {
                linger: 0,
                recv_timeout: 1000,
                ..Default::default()
            },
            &format!("inproc://{}-tc", name),
        )
        .unwrap()
    }

    /// Poll the server until a TC arrives.
    fn wait_tc(server: &mut ArmServer) -> Result<Tc, ArmServerError> {
        for _ in 0..200 {
            match server.get_tc() {
                Ok(None) => continue,
                Ok(Some(tc)) => return Ok(tc),
                Err(e) => return Err(e),
            }
        }
        panic!("No TC recieved");
    }

    #[test]
    fn test_no_tc() {
        let ctx = zmq::Context::new();
        let mut server = server(&ctx, "arm-server-empty");

        assert!(matches!(server.get_tc(), Ok(None)));
    }

    #[test]
    fn test_tc_round_trip() {
        let ctx = zmq::Context::new();
        let mut server = server(&ctx, "arm-server-tc");
        let client = client(&ctx, "arm-server-tc");

        let tc = Tc::Arm(ArmCmd::angle("wrist", 45));
        client.send(&tc.to_json(), 0).unwrap();

        assert_eq!(wait_tc(&mut server).unwrap(), tc);
        server.send_response(&TcResponse::Ok).unwrap();

        let resp = client.recv_string(0).unwrap().unwrap();
        assert_eq!(TcResponse::from_json(&resp).unwrap(), TcResponse::Ok);
    }

    #[test]
    fn test_invalid_tc() {
        let ctx = zmq::Context::new();
        let mut server = server(&ctx, "arm-server-invalid");
        let client = client(&ctx, "arm-server-invalid");

        client.send(r#"{"type": "servo_spin"}"#, 0).unwrap();

        assert!(matches!(
            wait_tc(&mut server),
            Err(ArmServerError::TcParseError(TcParseError::InvalidType(_)))
        ));

        // A response is still owed
        server
            .send_response(&TcResponse::Invalid("bad".into()))
            .unwrap();
        let resp = client.recv_string(0).unwrap().unwrap();
        assert_eq!(
            TcResponse::from_json(&resp).unwrap(),
            TcResponse::Invalid("bad".into())
        );
    }

    #[test]
    fn test_publish_without_subscribers() {
        let ctx = zmq::Context::new();
        let mut server = server(&ctx, "arm-server-tm");

        let packet = TmPacket::new(
            ArmData {
                name: "arm".into(),
                data: Vec::new(),
            },
            &StatusReport::default(),
        );

        assert!(server.publish(&packet).is_ok());
    }
}
