/* SPDX-License-Identifier: GPL-2.0-only */

//! Chrome EC host command protocol, version 3.

use core::fmt;
use device::ErrorKind;
use log::{error, trace};

use super::CrosEcBus;

pub const EC_HOST_REQUEST_HEADER_BYTES: usize = 8;
pub const EC_HOST_RESPONSE_HEADER_BYTES: usize = 8;
pub const EC_HOST_REQUEST_VERSION: u8 = 3;
pub const EC_HOST_RESPONSE_VERSION: u8 = 3;
/// Largest request or response packet, header included
pub const EC_HOST_PACKET_SIZE: usize = 0x100;

/// Commands for a device behind the EC are offset by this much per device
pub const EC_CMD_PASSTHRU_OFFSET: u16 = 0x4000;

pub const fn ec_cmd_passthru_offset(dev_index: u8) -> u16 {
    EC_CMD_PASSTHRU_OFFSET * dev_index as u16
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Request does not fit a packet
    RequestTruncated,
    /// Response does not fit the caller's buffer
    ResponseTooBig,
    /// Caller's buffer cannot hold a response header
    ResponseTooSmall,
    /// Malformed response header
    InvalidResponse,
    /// Response bytes summed to the contained value instead of zero
    InvalidChecksum(u8),
    /// The EC completed the command with a nonzero result code
    Response(u16),
    /// The EC stayed busy for the whole polling budget
    NotResponding,
    /// The underlying bus failed
    Bus(ErrorKind),
}

impl device::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestTruncated | Self::ResponseTooBig | Self::ResponseTooSmall => {
                ErrorKind::InvalidArgument
            }
            Self::InvalidResponse | Self::InvalidChecksum(_) | Self::Response(_) => {
                ErrorKind::Device
            }
            Self::NotResponding => ErrorKind::Timeout,
            Self::Bus(kind) => *kind,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Bus(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestTruncated => write!(f, "request too big"),
            Self::ResponseTooBig => write!(f, "EC returned too much data"),
            Self::ResponseTooSmall => write!(f, "response buffer smaller than header"),
            Self::InvalidResponse => write!(f, "invalid response header"),
            Self::InvalidChecksum(c) => write!(f, "response checksum invalid: 0x{:02x}", c),
            Self::Response(r) => write!(f, "EC response with error code: {}", r),
            Self::NotResponding => write!(f, "EC not responding"),
            Self::Bus(kind) => write!(f, "bus error: {}", kind),
        }
    }
}

/* internal structure to send a command to the EC and wait for response. */
pub struct CrosEcCommand<'a> {
    /// command code
    pub code: u16,
    /// command version
    pub version: u8,
    /// command data, if any
    pub data_in: &'a [u8],
    /// room for the command response; its length is the most accepted
    pub data_out: &'a mut [u8],
    /// device index for passthru
    pub dev_index: u8,
}

/**
 * struct ec_host_request - Version 3 request from host.
 * @struct_version: Should be 3. The EC will return EC_RES_INVALID_HEADER if it
 *                  receives a header with a version it doesn't know how to
 *                  parse.
 * @checksum: Checksum of request and data; sum of all bytes including checksum
 *            should total to 0.
 * @command: Command to send (EC_CMD_...)
 * @command_version: Command version.
 * @reserved: Unused byte in current protocol version; set to 0.
 * @data_len: Length of data which follows this header.
 */
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EcHostRequest {
    pub struct_version: u8,
    pub checksum: u8,
    pub command: u16,
    pub command_version: u8,
    pub reserved: u8,
    pub data_len: u16,
}

impl EcHostRequest {
    pub fn as_bytes(&self) -> [u8; EC_HOST_REQUEST_HEADER_BYTES] {
        let cmd = self.command.to_le_bytes();
        let data_len = self.data_len.to_le_bytes();
        [
            self.struct_version,
            self.checksum,
            cmd[0],
            cmd[1],
            self.command_version,
            self.reserved,
            data_len[0],
            data_len[1],
        ]
    }
}

/**
 * struct ec_host_response - Version 3 response from EC.
 * @struct_version: Struct version (=3).
 * @checksum: Checksum of response and data; sum of all bytes including
 *            checksum should total to 0.
 * @result: EC's response to the command (separate from communication failure)
 * @data_len: Length of data which follows this header.
 * @reserved: Unused bytes in current protocol version; set to 0.
 */
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EcHostResponse {
    pub struct_version: u8,
    pub checksum: u8,
    pub result: u16,
    pub data_len: u16,
    pub reserved: u16,
}

impl EcHostResponse {
    pub fn from_bytes(b: &[u8; EC_HOST_RESPONSE_HEADER_BYTES]) -> Self {
        Self {
            struct_version: b[0],
            checksum: b[1],
            result: u16::from_le_bytes([b[2], b[3]]),
            data_len: u16::from_le_bytes([b[4], b[5]]),
            reserved: u16::from_le_bytes([b[6], b[7]]),
        }
    }

    pub fn as_bytes(&self) -> [u8; EC_HOST_RESPONSE_HEADER_BYTES] {
        let r = self.result.to_le_bytes();
        let d = self.data_len.to_le_bytes();
        let res = self.reserved.to_le_bytes();
        [self.struct_version, self.checksum, r[0], r[1], d[0], d[1], res[0], res[1]]
    }
}

/* Calculate a simple 8-bit checksum of a data block */
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |csum, b| csum.wrapping_add(*b))
}

/**
 * Create a request packet for protocol version 3.
 *
 * Returns the packet size in bytes.
 */
pub fn create_proto3_request(cmd: &CrosEcCommand<'_>, buf: &mut [u8]) -> Result<usize, Error> {
    let out_bytes = cmd.data_in.len() + EC_HOST_REQUEST_HEADER_BYTES;

    /* Fail if output size is too big */
    if out_bytes > buf.len() || out_bytes > EC_HOST_PACKET_SIZE {
        error!("cros_ec: cannot send {} bytes", cmd.data_in.len());
        return Err(Error::RequestTruncated);
    }

    let rq = EcHostRequest {
        struct_version: EC_HOST_REQUEST_VERSION,
        checksum: 0,
        command: cmd.code + ec_cmd_passthru_offset(cmd.dev_index),
        command_version: cmd.version,
        reserved: 0,
        data_len: cmd.data_in.len() as u16,
    };
    buf[..EC_HOST_REQUEST_HEADER_BYTES].copy_from_slice(&rq.as_bytes());

    /* Copy data after header */
    buf[EC_HOST_REQUEST_HEADER_BYTES..out_bytes].copy_from_slice(cmd.data_in);

    /* Write checksum field so the entire packet sums to 0 */
    buf[1] = checksum(&buf[..out_bytes]).wrapping_neg();

    trace!("cros_ec: out {:02x?}", &buf[..out_bytes]);
    Ok(out_bytes)
}

/// Largest response packet `cmd` can accept
pub fn prepare_proto3_response_buffer(cmd: &CrosEcCommand<'_>) -> Result<usize, Error> {
    let in_bytes = cmd.data_out.len() + EC_HOST_RESPONSE_HEADER_BYTES;

    /* Fail if input size is too big */
    if in_bytes > EC_HOST_PACKET_SIZE {
        error!("cros_ec: cannot receive {} bytes", cmd.data_out.len());
        return Err(Error::ResponseTooBig);
    }
    Ok(in_bytes)
}

/**
 * Handle a protocol version 3 response packet.
 *
 * Copies the response data into `cmd.data_out` and returns its length.
 */
pub fn handle_proto3_response(resp: &[u8], cmd: &mut CrosEcCommand<'_>) -> Result<usize, Error> {
    let header: &[u8; EC_HOST_RESPONSE_HEADER_BYTES] = resp
        .get(..EC_HOST_RESPONSE_HEADER_BYTES)
        .and_then(|h| h.try_into().ok())
        .ok_or(Error::InvalidResponse)?;
    let rs = EcHostResponse::from_bytes(header);

    /* Check input data */
    if rs.struct_version != EC_HOST_RESPONSE_VERSION {
        error!("cros_ec: EC response version mismatch");
        return Err(Error::InvalidResponse);
    }

    if rs.reserved != 0 {
        error!("cros_ec: EC response reserved != 0");
        return Err(Error::InvalidResponse);
    }

    let data_len = rs.data_len as usize;
    let in_bytes = EC_HOST_RESPONSE_HEADER_BYTES + data_len;
    if in_bytes > resp.len() || data_len > cmd.data_out.len() {
        error!("cros_ec: EC returned too much data");
        return Err(Error::ResponseTooBig);
    }

    trace!("cros_ec: in {:02x?}", &resp[..in_bytes]);

    /* Verify checksum */
    let csum = checksum(&resp[..in_bytes]);
    if csum != 0 {
        error!("cros_ec: EC response checksum invalid: 0x{:02x}", csum);
        return Err(Error::InvalidChecksum(csum));
    }

    /* Return error result, if any */
    if rs.result != 0 {
        error!("cros_ec: EC response with error code: {}", rs.result);
        return Err(Error::Response(rs.result));
    }

    cmd.data_out[..data_len].copy_from_slice(&resp[EC_HOST_RESPONSE_HEADER_BYTES..in_bytes]);
    Ok(data_len)
}

/// Frame `cmd`, send it over `bus` and unpack the answer
pub fn send_command_proto3(
    cmd: &mut CrosEcCommand<'_>,
    bus: &mut dyn CrosEcBus,
) -> Result<usize, Error> {
    let mut req = [0u8; EC_HOST_PACKET_SIZE];
    let mut resp = [0u8; EC_HOST_PACKET_SIZE];

    /* Create request packet */
    let out_bytes = create_proto3_request(cmd, &mut req)?;

    /* Prepare response buffer */
    let in_bytes = prepare_proto3_response_buffer(cmd)?;

    bus.send_packet(&req[..out_bytes], &mut resp[..in_bytes]).map_err(|e| {
        error!("cros_ec: failed to complete I/O: {}", e);
        e
    })?;

    /* Process the response */
    handle_proto3_response(&resp[..in_bytes], cmd)
}
