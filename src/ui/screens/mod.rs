pub(crate) mod analysis;
pub(crate) mod receipts;
pub(crate) mod review;
