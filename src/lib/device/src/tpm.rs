use crate::Result;

/// Raw TPM command transport
pub trait TpmOps {
    /// Send one command and collect the response, returning its length
    fn xmit(&mut self, sendbuf: &[u8], recvbuf: &mut [u8]) -> Result<usize>;
}
