mod csv_import;

pub(crate) use csv_import::{parse_date, parse_decimal, ClientImport, CsvImporter, REQUIRED_HEADERS};
