use std::fs;
use std::io::Cursor;

use walletlib::{
    dump::history_to_files,
    error::WalletError,
    formats::{lines::Lines, pipe::Pipe},
    model::{Account, Payment, PaymentStatus},
    service::Wallet,
    traits::{ReadRecords, WriteRecords},
};

fn sample_wallet() -> Wallet {
    let mut wallet = Wallet::new();
    let a = wallet.register_account("+992000000001").unwrap().id;
    let b = wallet.register_account("+992000000002").unwrap().id;
    wallet.deposit(a, 1_000).unwrap();
    wallet.deposit(b, 500).unwrap();
    let p = wallet.pay(a, 100, "auto").unwrap();
    wallet.pay(b, 50, "food").unwrap();
    wallet.reject(&p.id).unwrap();
    wallet.favorite_payment(&p.id, "Car").unwrap();
    wallet
}

#[test]
fn directory_export_then_import() {
    let dir = tempfile::tempdir().expect("tempdir");
    let wallet = sample_wallet();
    wallet.export(dir.path()).expect("export");

    let accounts = fs::read_to_string(dir.path().join("accounts.dump")).unwrap();
    assert_eq!(accounts, "1;+992000000001;1000\n2;+992000000002;450\n");

    let mut restored = Wallet::new();
    restored.import(dir.path()).expect("import");
    assert_eq!(restored.accounts(), wallet.accounts());
    assert_eq!(restored.payments(), wallet.payments());
    assert_eq!(restored.favorites(), wallet.favorites());
    assert_eq!(restored.payments()[0].status, PaymentStatus::Fail);

    // id counter continues after the imported accounts
    assert_eq!(restored.register_account("+992000000003").unwrap().id, 3);
}

#[test]
fn import_tolerates_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut wallet = Wallet::new();
    wallet.register_account("+1").unwrap();
    wallet.export(dir.path()).unwrap();
    assert!(!dir.path().join("payments.dump").exists());

    let mut restored = Wallet::new();
    restored.import(dir.path()).expect("import");
    assert_eq!(restored.accounts().len(), 1);
    assert!(restored.payments().is_empty());
}

#[test]
fn import_rejects_colliding_phone() {
    let dir = tempfile::tempdir().unwrap();
    sample_wallet().export(dir.path()).unwrap();

    let mut wallet = Wallet::new();
    wallet.register_account("+992000000002").unwrap();
    let err = wallet.import(dir.path()).unwrap_err();
    assert!(matches!(err, WalletError::DuplicateAccountId(1) | WalletError::DuplicatePhone));
}

#[test]
fn failed_import_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("accounts.dump"), "5;+9;10\n6;+1;0\n").unwrap();

    let mut wallet = Wallet::new();
    wallet.register_account("+1").unwrap();
    let before = wallet.accounts().to_vec();

    let err = wallet.import(dir.path()).unwrap_err();
    assert!(matches!(err, WalletError::DuplicatePhone));
    assert_eq!(wallet.accounts(), before.as_slice());
    assert_eq!(wallet.register_account("+2").unwrap().id, 2);
}

#[test]
fn import_rejects_invalid_numbers() {
    let cases = [
        ("accounts.dump", "1;+9;-500\n"),
        ("payments.dump", "p;-7;x;INPROGRESS;42\n"),
        ("payments.dump", "p;0;x;FAIL;1\n"),
        ("favorites.dump", "f;-1;x;Car;1\n"),
    ];
    for (file, body) in cases {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(file), body).unwrap();

        let mut wallet = Wallet::new();
        let err = wallet.import(dir.path()).unwrap_err();
        assert!(matches!(err, WalletError::Parse(_)), "{file}: {body:?}");
        assert!(wallet.accounts().is_empty());
    }
}

#[test]
fn import_rejects_records_of_unknown_accounts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("accounts.dump"), "1;+9;500\n").unwrap();
    fs::write(dir.path().join("payments.dump"), "p;7;x;INPROGRESS;42\n").unwrap();

    let mut wallet = Wallet::new();
    let err = wallet.import(dir.path()).unwrap_err();
    assert!(matches!(err, WalletError::AccountNotFound));
    assert!(wallet.accounts().is_empty());
    assert!(wallet.payments().is_empty());

    fs::remove_file(dir.path().join("payments.dump")).unwrap();
    fs::write(dir.path().join("favorites.dump"), "f;7;x;Car;2\n").unwrap();
    let err = wallet.import(dir.path()).unwrap_err();
    assert!(matches!(err, WalletError::AccountNotFound));
    assert!(wallet.favorites().is_empty());

    // records of an account that already lives in the wallet are fine
    wallet.register_account("+2").unwrap();
    wallet.register_account("+3").unwrap();
    fs::remove_file(dir.path().join("accounts.dump")).unwrap();
    wallet.import(dir.path()).expect("import favorite of account 2");
    assert_eq!(wallet.favorites().len(), 1);
}

#[test]
fn single_file_import_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.txt");
    fs::write(&path, "3;+7;1|4;+7;2|").unwrap();

    let mut wallet = Wallet::new();
    assert!(matches!(wallet.import_from_file(&path), Err(WalletError::DuplicatePhone)));
    assert!(wallet.accounts().is_empty());
}

#[test]
fn single_file_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.txt");
    sample_wallet().export_to_file(&path).expect("export");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "1;+992000000001;1000|2;+992000000002;450|"
    );

    let mut restored = Wallet::new();
    restored.import_from_file(&path).expect("import");
    assert_eq!(restored.accounts().len(), 2);
    assert_eq!(restored.find_account_by_id(2).unwrap().balance, 450);
}

#[test]
fn pipe_read_skips_trailing_segment() {
    let accounts: Vec<Account> = Pipe::read(Cursor::new("7;+1;5|8;+2;0|")).expect("read");
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].id, 8);
}

#[test]
fn lines_write_payment_layout() {
    let payment = Payment {
        id: "p-1".into(),
        account_id: 4,
        amount: 20,
        category: "food".into(),
        status: PaymentStatus::InProgress,
    };
    let mut out = Vec::new();
    Lines::write(&mut out, std::slice::from_ref(&payment)).expect("write");
    assert_eq!(String::from_utf8(out.clone()).unwrap(), "p-1;20;food;INPROGRESS;4\n");

    let back: Vec<Payment> = Lines::read(Cursor::new(out)).expect("read");
    assert_eq!(back, vec![payment]);
}

#[test]
fn malformed_amount_is_parse_error() {
    let res: Result<Vec<Payment>, _> = Lines::read(Cursor::new("p;abc;food;FAIL;1\n"));
    assert!(matches!(res, Err(WalletError::Parse(_))));
}

#[test]
fn history_split_into_pages() {
    let mut wallet = Wallet::new();
    let id = wallet.register_account("+1").unwrap().id;
    wallet.deposit(id, 100).unwrap();
    for _ in 0..5 {
        wallet.pay(id, 1, "tick").unwrap();
    }
    let history = wallet.export_account_history(id);

    let dir = tempfile::tempdir().unwrap();
    history_to_files(&history, dir.path(), 2).expect("paged");
    for n in 1..=3 {
        assert!(dir.path().join(format!("payments{n}.dump")).exists());
    }
    assert!(!dir.path().join("payments4.dump").exists());
    let last = fs::read_to_string(dir.path().join("payments3.dump")).unwrap();
    assert_eq!(last.lines().count(), 1);

    let single = tempfile::tempdir().unwrap();
    history_to_files(&history, single.path(), 5).expect("single");
    assert!(single.path().join("payments.dump").exists());
    assert!(!single.path().join("payments1.dump").exists());

    assert!(matches!(
        history_to_files(&history, single.path(), 0),
        Err(WalletError::InvalidRecordsPerFile)
    ));
}
