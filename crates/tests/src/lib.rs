//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Wire layout constants
//! - Offline path: raw file → unpacker → frame files
//! - Live path over loopback UDP: receiver → queue → persister → raw files

#[cfg(test)]
mod contract_tests {
    use contracts::layout::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(HEADER_SIZE + BLOCK_COUNT * BLOCK_SIZE + TAIL_SIZE, PACKET_SIZE);
        assert_eq!(BLOCK_SIZE, 130);
        assert_eq!(RECORD_SIZE, TIMESTAMP_PREFIX_SIZE + PACKET_SIZE);
    }

    #[test]
    fn test_reflectivity_curve_is_total_and_monotonic() {
        let calibration = decoder::Calibration::xt32();
        let mut previous = -1.0;
        for r in 0..=255usize {
            let value = calibration.intensity(r).unwrap();
            assert!(value > previous, "curve not increasing at {r}");
            previous = value;
        }
        assert_eq!(calibration.intensity(255).unwrap(), 255.08);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{BackpressurePolicy, CaptureConfig, PersistConfig, QueueConfig, ReceiverConfig};
    use decoder::calibration::{XT32_ELEVATION_DEG, XT32_REFLECTIVITY_CURVE};
    use decoder::mock::{record, PacketBuilder};
    use ingestion::{capture_queue, IngestionMetrics, PacketReceiver};
    use storage::Persister;
    use tokio::net::UdpSocket;
    use tokio::sync::watch;
    use unpacker::{UnpackOptions, Unpacker};

    /// Reference conversion written out longhand
    fn expected_row(azimuth: u16, distance: u16, reflectivity: u8, laser: usize) -> [f64; 4] {
        let r = distance as f64 * 0.004;
        let omega = XT32_ELEVATION_DEG[laser] * std::f64::consts::PI / 180.0;
        let alpha = azimuth as f64 / 100.0 * std::f64::consts::PI / 180.0;
        [
            r * omega.cos() * alpha.sin(),
            r * omega.cos() * alpha.cos(),
            r * omega.sin(),
            XT32_REFLECTIVITY_CURVE[reflectivity as usize],
        ]
    }

    fn read_rows(path: &Path) -> Vec<[f64; 4]> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| {
                let v: Vec<f64> = line.split(',').map(|s| s.parse().unwrap()).collect();
                [v[0], v[1], v[2], v[3]]
            })
            .collect()
    }

    fn find_frame(root: &Path, name: &str) -> PathBuf {
        for bucket in fs::read_dir(root).unwrap() {
            let candidate = bucket.unwrap().path().join(name);
            if candidate.is_file() {
                return candidate;
            }
        }
        panic!("{name} not found under {}", root.display());
    }

    fn assert_rows_close(actual: &[[f64; 4]], expected: &[[f64; 4]]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            for i in 0..4 {
                assert!((a[i] - e[i]).abs() < 1e-9, "{a:?} != {e:?}");
            }
        }
    }

    /// Two records on disk → two frame files whose rows match the reference conversion
    #[test]
    fn test_e2e_unpack_two_records() {
        let dir = tempfile::tempdir().unwrap();

        let first = PacketBuilder::new()
            .azimuth(0, 100)
            .laser(0, 0, 250, 10)
            .laser(0, 31, 1000, 200)
            .azimuth(5, 18000)
            .laser(5, 16, 42, 0)
            .build();
        let second = PacketBuilder::new()
            .azimuth(7, 35999)
            .laser(7, 2, 65535, 255)
            .laser(7, 3, 0, 99)
            .build();

        let mut bytes = record(1_700_000_000.5, &first).to_vec();
        bytes.extend_from_slice(&record(1_700_000_000.6, &second));
        fs::write(dir.path().join("2023-11-14_2213.bin"), bytes).unwrap();

        let report = Unpacker::new(decoder::Calibration::xt32(), UnpackOptions::new(dir.path()))
            .run()
            .unwrap();
        assert_eq!(report.frames_written, 2);
        assert!(report.is_clean());

        let rows = read_rows(&find_frame(dir.path(), "frame0.csv"));
        assert_rows_close(
            &rows,
            &[
                expected_row(100, 250, 10, 0),
                expected_row(100, 1000, 200, 31),
                expected_row(18000, 42, 0, 16),
            ],
        );

        // Zero-distance unit produces no row
        let rows = read_rows(&find_frame(dir.path(), "frame1.csv"));
        assert_rows_close(&rows, &[expected_row(35999, 65535, 255, 2)]);
    }

    async fn capture_over_loopback(queue: QueueConfig, packets: u32) -> (PathBuf, tempfile::TempDir) {
        let base = tempfile::tempdir().unwrap();
        let capture_dir = base.path().join("session");

        let metrics = Arc::new(IngestionMetrics::new());
        let receiver_config = ReceiverConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };
        let receiver = PacketReceiver::bind(&receiver_config, metrics.clone())
            .await
            .unwrap();
        let target = receiver.local_addr();

        let (tx, rx) = capture_queue(&queue, metrics.clone());
        let persister = Persister::spawn(rx, capture_dir.clone(), &PersistConfig::default()).unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);
        let receiver_task = tokio::spawn(receiver.run(tx, stop_rx));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for seq in 0..packets {
            let packet = PacketBuilder::new()
                .sequence(seq)
                .azimuth(0, (seq * 10) as u16)
                .laser(0, 0, 500, 50)
                .build();
            sender.send_to(&packet, target).await.unwrap();
        }
        sender.send_to(&[0u8; 64], target).await.unwrap();

        // Wait until every datagram has been seen (loopback may still drop under load)
        let expected = packets as u64 + 1;
        for _ in 0..200 {
            if metrics.snapshot().packets_received >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        stop_tx.send(true).unwrap();
        receiver_task.await.unwrap().unwrap();
        let stats = persister.join().await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot.packets_enqueued,
            stats.persisted + snapshot.packets_dropped,
            "queue conservation violated"
        );
        assert_eq!(stats.write_failures, 0);
        assert!(snapshot.packets_malformed <= 1);
        (capture_dir, base)
    }

    /// Live capture → raw file → unpack, with a blocking queue nothing is lost in between
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_e2e_loopback_capture_then_unpack() {
        let (capture_dir, _base) = capture_over_loopback(QueueConfig::default(), 50).await;

        let total: u64 = fs::read_dir(&capture_dir)
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();
        assert_eq!(total % contracts::layout::RECORD_SIZE as u64, 0);
        let persisted = total / contracts::layout::RECORD_SIZE as u64;
        assert!(persisted > 0);

        let report = Unpacker::new(decoder::Calibration::xt32(), UnpackOptions::new(&capture_dir))
            .run()
            .unwrap();
        assert_eq!(report.frames_written, persisted);
        assert_eq!(report.points_written, persisted);
        assert!(report.is_clean());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_e2e_drop_oldest_conserves_packets() {
        let queue = QueueConfig {
            capacity: 4,
            backpressure: BackpressurePolicy::DropOldest,
        };
        let (capture_dir, _base) = capture_over_loopback(queue, 200).await;
        assert!(capture_dir.is_dir());
    }

    #[test]
    fn test_config_file_drives_unpack_format() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("xt32.toml");
        fs::write(&config_path, "[unpack]\nformat = \"ply\"\n").unwrap();
        let config: CaptureConfig = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();

        let packet = PacketBuilder::new().laser(0, 8, 100, 1).build();
        fs::write(dir.path().join("a.bin"), record(1_700_000_000.0, &packet)).unwrap();

        let mut options = UnpackOptions::new(dir.path());
        options.format = config.unpack.format;
        let report = Unpacker::new(decoder::Calibration::xt32(), options).run().unwrap();
        assert_eq!(report.frames_written, 1);

        let text = fs::read_to_string(find_frame(dir.path(), "frame0.ply")).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("element vertex 1\n"));
    }
}
