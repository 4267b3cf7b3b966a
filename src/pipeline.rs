//! Turning a Drive URL into domain objects and handing them to a processor.

use tracing::info;

use crate::error::Result;
use crate::policy::HandlingPolicy;
use crate::reader::{read_spreadsheet, SheetRecord, SpreadsheetSource};
use crate::traverser::{list_spreadsheets_in_folder, FolderListing};
use crate::url_parser::{classify, spreadsheet_url, ResourceKind, ResourceReference};

/// Builds application objects from spreadsheet tabs.
pub trait DomainObjectFactory {
    type Object;
    type Policy: HandlingPolicy;

    /// Rules used while scanning folders and reading tabs.
    fn handling_policy(&self) -> &Self::Policy;

    /// Build one object from a tab. `source_url` is the spreadsheet's URL.
    fn create_domain_object(&self, record: SheetRecord, source_url: &str) -> Result<Self::Object>;
}

/// Consumes every object collected from a URL in one call.
pub trait DomainObjectProcessor<T> {
    type Output;

    fn process_domain_objects(&mut self, objects: Vec<T>) -> Result<Self::Output>;
}

/// Reads a spreadsheet or a folder of spreadsheets into domain objects.
pub struct DriveProcessService<D, S> {
    drive: D,
    sheets: S,
}

impl<D, S> DriveProcessService<D, S>
where
    D: FolderListing,
    S: SpreadsheetSource,
{
    pub fn new(drive: D, sheets: S) -> Self {
        Self { drive, sheets }
    }

    /// Classify `url` and process it.
    pub async fn process_url<F, P>(
        &self,
        processor: &mut P,
        url: &str,
        recursive: bool,
        factory: &F,
    ) -> Result<P::Output>
    where
        F: DomainObjectFactory,
        P: DomainObjectProcessor<F::Object>,
    {
        let reference = classify(url)?;
        self.process(processor, &reference, recursive, factory).await
    }

    /// Collect the domain objects behind `reference` and pass them to the
    /// processor. Objects come in spreadsheet order, then tab order. Any read
    /// failure aborts the whole run.
    pub async fn process<F, P>(
        &self,
        processor: &mut P,
        reference: &ResourceReference,
        recursive: bool,
        factory: &F,
    ) -> Result<P::Output>
    where
        F: DomainObjectFactory,
        P: DomainObjectProcessor<F::Object>,
    {
        let objects = match reference.kind() {
            ResourceKind::Spreadsheet => {
                self.collect_spreadsheet(reference.id(), reference.url(), factory)
                    .await?
            }
            ResourceKind::Folder => {
                let policy = factory.handling_policy();
                let spreadsheet_ids =
                    list_spreadsheets_in_folder(&self.drive, reference.id(), recursive, policy)
                        .await?;
                info!(
                    folder_id = reference.id(),
                    spreadsheets = spreadsheet_ids.len(),
                    "Found spreadsheets in folder"
                );

                let mut objects = Vec::new();
                for spreadsheet_id in &spreadsheet_ids {
                    let url = spreadsheet_url(spreadsheet_id);
                    objects.extend(self.collect_spreadsheet(spreadsheet_id, &url, factory).await?);
                }
                objects
            }
        };

        info!(objects = objects.len(), "Processing domain objects");
        processor.process_domain_objects(objects)
    }

    async fn collect_spreadsheet<F>(
        &self,
        spreadsheet_id: &str,
        source_url: &str,
        factory: &F,
    ) -> Result<Vec<F::Object>>
    where
        F: DomainObjectFactory,
    {
        let records = read_spreadsheet(&self.sheets, spreadsheet_id, factory.handling_policy()).await?;
        records
            .into_iter()
            .map(|record| factory.create_domain_object(record, source_url))
            .collect()
    }
}
