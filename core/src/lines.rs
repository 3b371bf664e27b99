use std::io::{self, BufRead};

/// Lines of `reader` with `\n` / `\r\n` stripped.
///
/// Unlike [`BufRead::lines`], invalid UTF-8 does not end the stream: bad
/// sequences become U+FFFD and the line is still returned.
pub fn lossy_lines<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines { reader, buf: Vec::new() }
}

pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
