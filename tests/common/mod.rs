#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Six bookings over three days: three completed, two cancelled (one spelled
/// "canceled"), one incomplete. Two rows lack fare and distance, one lacks a
/// drop location.
pub const RIDES_CSV: &str = "\
Date,Time,Booking ID,Booking Status,Customer ID,Driver ID,Vehicle Type,Pickup Location,Drop Location,Booking Value,Ride Distance,Driver Ratings,Customer Rating,Cancelled Rides by Customer,Cancelled Rides by Driver,Payment Method,Reason for cancelling by Customer
2024-03-04,08:15:00,B1,Completed,C1,D1,Auto,Saket,Dwarka,200,10,4.5,4.8,null,null,UPI,null
2024-03-04,09:05:00,B2,completed,C2,D2,Sedan,Dwarka,Saket,400,20,4.0,4.2,null,null,Cash,null
2024-03-05,09:40:00,B3,canceled,C1,D1,Auto,Saket,,null,null,null,null,1,null,null,Driver is not moving towards pickup location
2024-03-05,17:20:00,B4,Cancelled,C3,D3,Bike,Noida,Saket,null,null,null,null,null,1,null,null
2024-03-06,17:45:00,B5,Incomplete,C1,D2,Sedan,Noida,Dwarka,300,15,3.5,4.0,null,null,UPI,null
2024-03-06,23:10:00,B6,Completed,C4,D1,Auto,Saket,Noida,100,5,5.0,,null,null,Card,null
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes raw bytes, for encodings other than UTF-8.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Writes the shared ride sample as `rides.csv`.
    pub fn rides(&self) -> PathBuf {
        self.write("rides.csv", RIDES_CSV)
    }
}
