mod notice_parser;

pub use notice_parser::{NoticeParser, TransferNoticeParser};
