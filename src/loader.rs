//! Download and decoding of the dataset archive
//!
//! The SSA publishes the dataset as a zip archive holding one `yobYYYY.txt`
//! file per year, where each line is a headerless `name,sex,count` record.

use crate::{
    progress::{ProgressReport, Work},
    table::{NameRecord, NameTable, Sex},
    Error, Name, NameCount, Result, Year, DATASET_URL,
};
use csv_async::AsyncReaderBuilder;
use futures::stream::StreamExt;
use reqwest::Response;
use serde::Deserialize;
use std::io::{self, Cursor, ErrorKind, Read};
use tokio::{io::AsyncReadExt, task::JoinSet};
use tokio_util::io::StreamReader;
use zip::ZipArchive;

/// Where the dataset archive comes from
///
/// This is all that a load depends on, which makes it the natural key for
/// caching loaded datasets.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DatasetSource {
    /// URL of the zip archive
    pub url: Box<str>,
}
//
impl Default for DatasetSource {
    fn default() -> Self {
        Self {
            url: DATASET_URL.into(),
        }
    }
}

/// Upper bound on buffer preallocation from sizes announced by the server or
/// the archive, which are not trustworthy
const MAX_PREALLOCATION: usize = 64 << 20;

/// Number of fields in a yearly data file line
const ROW_FIELDS: usize = 3;

/// Line from a yearly data file
#[derive(Clone, Debug, Deserialize, PartialEq)]
struct Row {
    name: Name,
    sex: Sex,
    count: NameCount,
}

/// Yearly data file, extracted from the archive but not parsed yet
#[derive(Debug)]
struct YearlyFile {
    file_name: Box<str>,
    year: Year,
    contents: Vec<u8>,
}

/// Download the dataset archive and decode it into a flat table
///
/// Records do not carry a meaningful `pct` yet, see
/// [`annotate()`](crate::table::annotate).
pub async fn load(
    client: reqwest::Client,
    source: DatasetSource,
    report: ProgressReport,
) -> Result<NameTable> {
    let archive = fetch(&client, &source.url, &report).await?;
    parse_archive(&archive, &report).await
}

/// Download the dataset archive into memory
pub async fn fetch(client: &reqwest::Client, url: &str, report: &ProgressReport) -> Result<Vec<u8>> {
    // Start the download
    let response = client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(|e| Error::fetch(url, e))?;
    let content_length = response.content_length();
    let bytes = report.add("Downloading name dataset", Work::Bytes(content_length));

    // Collect the body, tracking how many bytes have been downloaded so far
    let tracker = bytes.clone();
    let mut body = std::pin::pin!(StreamReader::new(response.bytes_stream().map(
        move |res| {
            res.inspect(|block| tracker.make_progress(block.len() as u64))
                // Translate reqwest errors into I/O errors
                .map_err(|e| io::Error::new(ErrorKind::Other, e))
        }
    )));
    let mut archive = Vec::with_capacity(capacity_hint(content_length.unwrap_or(0)));
    let downloaded = body.read_to_end(&mut archive).await;
    bytes.finish();
    downloaded.map_err(|e| Error::fetch(url, e))?;
    log::info!("Downloaded {} bytes from {url}", archive.len());
    Ok(archive)
}

/// Decode an in-memory dataset archive into a flat table
///
/// Yearly files are parsed concurrently, but the resulting table follows the
/// archive's entry order so that decoding the same archive twice yields the
/// same table.
pub async fn parse_archive(archive: &[u8], report: &ProgressReport) -> Result<NameTable> {
    let yearly_files = extract_yearly_files(archive)?;

    // Parse each yearly file in its own task
    let files = report.add("Parsing yearly files", Work::Files(yearly_files.len()));
    let mut tasks = JoinSet::new();
    for (position, file) in yearly_files.into_iter().enumerate() {
        let files = files.clone();
        tasks.spawn(async move {
            let records = parse_yearly_file(&file.file_name, file.year, &file.contents).await;
            files.make_progress(1);
            records.map(|records| (position, records))
        });
    }

    // Collect results as tasks finish, then restore archive order
    let parsed = async {
        let mut parsed = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            parsed.push(result??);
        }
        Ok::<_, Error>(parsed)
    }
    .await;
    files.finish();
    let mut parsed = parsed?;
    parsed.sort_unstable_by_key(|(position, _records)| *position);
    let num_files = parsed.len();
    let table = (parsed.into_iter())
        .flat_map(|(_position, records)| records)
        .collect::<NameTable>();
    log::info!("Loaded {} records from {num_files} yearly files", table.len());
    Ok(table)
}

/// Pull the raw contents of every yearly data file out of the archive
fn extract_yearly_files(archive: &[u8]) -> Result<Vec<YearlyFile>> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(|e| Error::format("archive", e))?;
    let mut yearly_files = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::format("archive", e))?;
        let file_name: Box<str> = entry.name().into();
        if !file_name.ends_with(".txt") {
            log::debug!("Skipping archive entry {file_name:?}, which is not a yearly data file");
            continue;
        }
        let year = year_from_file_name(&file_name)?;
        let mut contents = Vec::with_capacity(capacity_hint(entry.size()));
        entry
            .read_to_end(&mut contents)
            .map_err(|e| Error::format(&*file_name, e))?;
        yearly_files.push(YearlyFile {
            file_name,
            year,
            contents,
        });
    }
    if yearly_files.is_empty() {
        return Err(Error::format("archive", "no yearly data file found"));
    }
    Ok(yearly_files)
}

/// Buffer capacity to reserve for some announced amount of data
fn capacity_hint(announced: u64) -> usize {
    usize::try_from(announced).map_or(MAX_PREALLOCATION, |bytes| bytes.min(MAX_PREALLOCATION))
}

/// Decode the year that a data file is about from its name (`yobYYYY.txt`)
fn year_from_file_name(file_name: &str) -> Result<Year> {
    file_name
        .get(3..7)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| {
            Error::format(
                file_name,
                "file name should have a 4-digit year at offset 3, as in yob1880.txt",
            )
        })
}

/// Decode the records of one yearly data file
async fn parse_yearly_file(
    file_name: &str,
    year: Year,
    contents: &[u8],
) -> Result<Vec<NameRecord>> {
    let mut lines = AsyncReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .create_reader(contents)
        .into_records();
    let mut records = Vec::new();
    let mut unexpected_sex = 0usize;
    while let Some(line) = lines.next().await {
        let line = line.map_err(|e| Error::format(file_name, e))?;
        if line.len() != ROW_FIELDS {
            return Err(Error::format(
                file_name,
                format!(
                    "expected {ROW_FIELDS} fields (name, sex, count) on line {}, found {}",
                    line.position().map_or(0, |pos| pos.line()),
                    line.len()
                ),
            ));
        }
        let Row { name, sex, count } = line
            .deserialize::<Row>(None)
            .map_err(|e| Error::format(file_name, e))?;
        if let Sex::Other(_) = sex {
            unexpected_sex += 1;
        }
        records.push(NameRecord::new(name, sex, count, year));
    }
    if unexpected_sex > 0 {
        log::warn!(
            "{file_name} has {unexpected_sex} records with a sex other than F or M, keeping them as-is"
        );
    }
    log::trace!("Parsed {} records from {file_name}", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::{io::AsyncWriteExt, net::TcpListener};
    use zip::{write::SimpleFileOptions, ZipWriter};

    fn archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("starting a zip entry should succeed");
            zip.write_all(contents.as_bytes())
                .expect("writing to an in-memory zip should succeed");
        }
        zip.finish()
            .expect("finishing an in-memory zip should succeed")
            .into_inner()
    }

    async fn parse(files: &[(&str, &str)]) -> Result<NameTable> {
        parse_archive(&archive(files), &ProgressReport::hidden()).await
    }

    fn assert_format_error(result: Result<NameTable>, expected_location: &str) {
        match result {
            Err(Error::Format { location, .. }) => assert_eq!(&*location, expected_location),
            other => panic!("expected a format error at {expected_location}, got {other:?}"),
        }
    }

    #[test]
    fn year_is_read_at_fixed_offset() {
        assert_eq!(year_from_file_name("yob1880.txt").ok(), Some(1880));
        assert_eq!(year_from_file_name("yob2023.txt").ok(), Some(2023));
        assert!(year_from_file_name("yob18.txt").is_err());
        assert!(year_from_file_name("names.txt").is_err());
        assert!(year_from_file_name("yob+880.txt").is_err());
    }

    #[tokio::test]
    async fn parses_every_yearly_file() {
        let table = parse(&[
            ("yob1880.txt", "Mary,F,7065\r\nAnna,F,2604\r\nJohn,M,9655\r\n"),
            ("NationalReadMe.pdf", "%PDF-1.4 not a data file"),
            ("yob1881.txt", "Mary,F,6919\n"),
        ])
        .await
        .expect("well-formed archive should parse");
        assert_eq!(
            table.records(),
            &[
                NameRecord::new("Mary", Sex::Female, 7065, 1880),
                NameRecord::new("Anna", Sex::Female, 2604, 1880),
                NameRecord::new("John", Sex::Male, 9655, 1880),
                NameRecord::new("Mary", Sex::Female, 6919, 1881),
            ]
        );
    }

    #[tokio::test]
    async fn parsing_is_deterministic() {
        let files = (1880..1900)
            .map(|year| (format!("yob{year}.txt"), format!("Name{year},F,{year}\nOther,M,1\n")))
            .collect::<Vec<_>>();
        let files = files
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_str()))
            .collect::<Vec<_>>();
        let first = parse(&files).await.expect("archive should parse");
        let second = parse(&files).await.expect("archive should parse");
        assert_eq!(first.len(), 40);
        assert_eq!(first, second);
        assert!(first.records().windows(2).all(|w| w[0].year <= w[1].year));
    }

    #[tokio::test]
    async fn unexpected_sex_is_passed_through() {
        let table = parse(&[("yob1990.txt", "Sam,X,12\n")])
            .await
            .expect("unknown single-character sex should be accepted");
        assert_eq!(table.records()[0].sex, Sex::Other('X'));
    }

    #[tokio::test]
    async fn rejects_malformed_file_names() {
        assert_format_error(parse(&[("names.txt", "Mary,F,1\n")]).await, "names.txt");
    }

    #[tokio::test]
    async fn rejects_malformed_rows() {
        assert_format_error(parse(&[("yob1880.txt", "Mary,F,lots\n")]).await, "yob1880.txt");
        assert_format_error(parse(&[("yob1880.txt", "Mary,F,3,junk\n")]).await, "yob1880.txt");
        assert_format_error(
            parse(&[("yob1880.txt", "Mary,F,3,junk\nAnna,F,2,junk\n")]).await,
            "yob1880.txt",
        );
        assert_format_error(
            parse(&[("yob1880.txt", "Mary,F,3\nAnna,F,2,junk\n")]).await,
            "yob1880.txt",
        );
        assert_format_error(parse(&[("yob1880.txt", "Mary,F\n")]).await, "yob1880.txt");
        assert_format_error(parse(&[("yob1880.txt", "Mary,F,-3\n")]).await, "yob1880.txt");
        assert_format_error(parse(&[("yob1880.txt", "Mary,FM,3\n")]).await, "yob1880.txt");
    }

    #[tokio::test]
    async fn rejects_archives_without_data() {
        assert_format_error(parse(&[("NationalReadMe.pdf", "readme")]).await, "archive");
        assert_format_error(
            parse_archive(b"definitely not a zip", &ProgressReport::hidden()).await,
            "archive",
        );
    }

    #[test]
    fn announced_sizes_are_capped() {
        assert_eq!(capacity_hint(0), 0);
        assert_eq!(capacity_hint(4096), 4096);
        assert_eq!(capacity_hint(1_000_000_000_000_000), MAX_PREALLOCATION);
        assert_eq!(capacity_hint(u64::MAX), MAX_PREALLOCATION);
    }

    #[tokio::test]
    async fn failed_parsing_clears_progress() {
        let report = ProgressReport::hidden();
        let result = parse_archive(
            &archive(&[
                ("yob1880.txt", "Mary,F,7065\n"),
                ("yob1881.txt", "Mary,F,lots\n"),
            ]),
            &report,
        )
        .await;
        assert_format_error(result, "yob1881.txt");
        assert_eq!(report.active(), 0);
    }

    #[tokio::test]
    async fn bogus_content_length_is_a_fetch_error() {
        // Server announces a petabyte, then hangs up after two bytes
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("binding a local port should succeed");
        let addr = listener
            .local_addr()
            .expect("bound listener should have an address");
        let server = tokio::spawn(async move {
            let (mut socket, _peer) = listener
                .accept()
                .await
                .expect("client should connect");
            let mut request = [0; 4096];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000000000000\r\n\r\nPK")
                .await
                .expect("sending the response should succeed");
        });

        let url = format!("http://{addr}/names.zip");
        let report = ProgressReport::hidden();
        let result = fetch(&reqwest::Client::new(), &url, &report).await;
        assert!(
            matches!(&result, Err(Error::Fetch { .. })),
            "expected a fetch error, got {result:?}"
        );
        assert_eq!(report.active(), 0);
        server.await.expect("server task should not panic");
    }

    #[tokio::test]
    async fn network_failure_is_a_fetch_error() {
        let source = DatasetSource {
            url: "http://127.0.0.1:9/names.zip".into(),
        };
        let result = load(reqwest::Client::new(), source, ProgressReport::hidden()).await;
        assert!(
            matches!(&result, Err(Error::Fetch { url, .. }) if &**url == "http://127.0.0.1:9/names.zip"),
            "expected a fetch error, got {result:?}"
        );
    }
}
