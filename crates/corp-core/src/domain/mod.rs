//! 수집 대상별 도메인 레코드.

mod company;
mod finance;
mod identifiers;
mod news;
mod notice;
mod venture;

pub use company::*;
pub use finance::*;
pub use identifiers::*;
pub use news::*;
pub use notice::*;
pub use venture::*;
