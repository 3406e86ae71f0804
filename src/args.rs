use crate::page::PageRequest;

/// Command line arguments for the sort-page binary
#[derive(Debug, Clone, Default)]
pub struct PageArgs {
    pub file: Option<String>,
    pub sort: Vec<String>, // raw `field[,dir]` specs, in precedence order
    pub page: PageRequest,
    pub json: bool,
    pub check: bool, // report whether the input is already sorted; no paging
}

impl PageArgs {
    /// Whether the input comes from stdin
    pub fn reading_from_stdin(&self) -> bool {
        matches!(self.file.as_deref(), None | Some("-"))
    }
}
