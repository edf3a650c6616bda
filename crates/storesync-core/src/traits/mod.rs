mod completion;
mod embedding;
mod mail;
mod retrieval;
mod storage;

pub use completion::ITextCompleter;
pub use embedding::ITextEmbedder;
pub use mail::{IMailTransport, OutboundEmail};
pub use retrieval::IExampleRetriever;
pub use storage::{ICampaignStorage, IMasterDataReader, IRecipientStorage};
