pub(crate) mod clients;
pub(crate) mod dashboard;
pub(crate) mod payments;
